use crate::error::{Error, Result};
use mtc_instruction::{wrap, WORD_MODULUS};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number base used to render register values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Radix {
    #[default]
    Hexadecimal,
    Octal,
    Decimal,
    Binary,
}

impl FromStr for Radix {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hex" => Ok(Radix::Hexadecimal),
            "oct" => Ok(Radix::Octal),
            "int" => Ok(Radix::Decimal),
            "bin" => Ok(Radix::Binary),
            _ => Err(format!("Unknown radix \"{}\" (expected hex, oct, int or bin)", s)),
        }
    }
}

/// A single 16-bit cell. Every write wraps around 65536.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Register {
    value: u16,
}

impl Register {
    #[inline]
    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn set_value(&mut self, value: impl Into<i64>) {
        self.value = wrap(value.into(), WORD_MODULUS) as u16;
    }

    #[inline]
    pub fn high(&self) -> u8 {
        (self.value >> 8) as u8
    }

    pub fn set_high(&mut self, value: u8) {
        self.value = (self.value & 0x00FF) | ((value as u16) << 8);
    }

    #[inline]
    pub fn low(&self) -> u8 {
        (self.value & 0x00FF) as u8
    }

    pub fn set_low(&mut self, value: u8) {
        self.value = (self.value & 0xFF00) | value as u16;
    }

    pub fn get_bit(&self, position: u32) -> Result<bool> {
        Ok(self.value & Self::mask(position)? != 0)
    }

    pub fn set_bit(&mut self, position: u32, on: bool) -> Result<()> {
        let mask = Self::mask(position)?;
        if on {
            self.value |= mask;
        } else {
            self.value &= !mask;
        }
        Ok(())
    }

    pub fn flip_bit(&mut self, position: u32) -> Result<()> {
        self.value ^= Self::mask(position)?;
        Ok(())
    }

    fn mask(position: u32) -> Result<u16> {
        if position > 15 {
            return Err(Error::BitRange(position));
        }
        Ok(1 << position)
    }

    /// The value as text in the given base, padded to the full width of a word.
    pub fn render(&self, radix: Radix) -> String {
        match radix {
            Radix::Hexadecimal => format!("{:04X}", self.value),
            Radix::Octal => format!("{:06o}", self.value),
            Radix::Decimal => format!("{}", self.value),
            Radix::Binary => format!("{:016b}", self.value),
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(Radix::default()))
    }
}
