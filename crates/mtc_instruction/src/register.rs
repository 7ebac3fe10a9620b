/// The registers of the processor. The discriminant of each variant is the word the assembler
/// emits for a register operand, so the order here must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RegisterName {
    // General purpose
    A,
    B,
    C,
    D,

    // Segment
    CS,
    DS,
    ES,
    FS,
    GS,
    SS,

    // Control
    DI,
    SI,
    BP,
    SP,
    IP,
    FLAGS,
}

impl RegisterName {
    pub const COUNT: usize = 16;

    pub const ALL: [RegisterName; RegisterName::COUNT] = [
        RegisterName::A,
        RegisterName::B,
        RegisterName::C,
        RegisterName::D,
        RegisterName::CS,
        RegisterName::DS,
        RegisterName::ES,
        RegisterName::FS,
        RegisterName::GS,
        RegisterName::SS,
        RegisterName::DI,
        RegisterName::SI,
        RegisterName::BP,
        RegisterName::SP,
        RegisterName::IP,
        RegisterName::FLAGS,
    ];

    #[inline]
    pub fn encoding(self) -> u16 {
        self as u16
    }

    pub fn from_encoding(encoding: u16) -> Option<Self> {
        Self::ALL.get(encoding as usize).copied()
    }

    pub fn name(self) -> &'static str {
        use RegisterName::*;

        match self {
            A => "a",
            B => "b",
            C => "c",
            D => "d",
            CS => "cs",
            DS => "ds",
            ES => "es",
            FS => "fs",
            GS => "gs",
            SS => "ss",
            DI => "di",
            SI => "si",
            BP => "bp",
            SP => "sp",
            IP => "ip",
            FLAGS => "flags",
        }
    }
}

impl std::fmt::Display for RegisterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RegisterName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|register| register.name() == lower)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_matches_position() {
        for (i, register) in RegisterName::ALL.iter().enumerate() {
            assert_eq!(i as u16, register.encoding());
            assert_eq!(Some(*register), RegisterName::from_encoding(i as u16));
        }
        assert_eq!(None, RegisterName::from_encoding(16));
    }

    #[test]
    fn parse_names() {
        assert_eq!(Ok(RegisterName::A), "a".parse());
        assert_eq!(Ok(RegisterName::FLAGS), "FLAGS".parse());
        assert_eq!(Ok(RegisterName::SP), "Sp".parse());
        assert_eq!(Err("ax".to_string()), "ax".parse::<RegisterName>());
    }
}
