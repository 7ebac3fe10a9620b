mod calc;
#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::memory::{wrap, Memory};
use crate::register::{Radix, Register};
use bitflags::bitflags;
use mtc_instruction::{Entry, InstructionCatalog, OperandKind, Operation, RegisterName};
use std::fmt::{Display, Formatter};
use tracing::debug;

bitflags! {
    pub struct Flags : u16 {
        const CARRY = 1 << 0;
        const PARITY = 1 << 2;
        const AUX_CARRY = 1 << 4;
        const ZERO = 1 << 6;
        const SIGN = 1 << 7;
        const TRAP = 1 << 8;
    }
}

/// Sent when the instruction or stack pointer moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub register: RegisterName,
    pub address: u16,
}

pub type PointerListener = Box<dyn Fn(&PointerEvent)>;

/// Where an operand resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Location {
    Register(RegisterName),
    Memory(u16),
    Immediate(u16),
}

/// What happens to IP after an instruction.
enum Flow {
    Advance,
    Jump(u16),
}

/// Registers and memory of the machine. Every call to [`Processor::step`] runs one complete
/// fetch, decode, execute cycle.
pub struct Processor {
    registers: [Register; RegisterName::COUNT],
    memory: Memory,
    catalog: &'static InstructionCatalog,

    last_instruction: Option<Entry>,
    listeners: Vec<PointerListener>,
}

impl Default for Processor {
    fn default() -> Self {
        Self::with_memory(Memory::default())
    }
}

impl Processor {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::with_memory(Memory::with_capacity(capacity)?))
    }

    fn with_memory(memory: Memory) -> Self {
        let mut processor = Self {
            registers: [Register::default(); RegisterName::COUNT],
            memory,
            catalog: InstructionCatalog::get(),
            last_instruction: None,
            listeners: vec![],
        };
        processor.reset();
        processor
    }

    /// Clear every register and put the stack pointer at the top of memory.
    pub fn reset(&mut self) {
        self.registers = [Register::default(); RegisterName::COUNT];
        let top = self.memory.capacity() as i64 - 1;
        self.register_mut(RegisterName::SP).set_value(top);
        self.last_instruction = None;
    }

    /// Reset the processor, write `image` to memory from address 0 and start executing at
    /// `entry`. An image larger than memory is rejected and nothing is changed.
    pub fn load(&mut self, image: &[u16], entry: u16) -> Result<()> {
        if image.len() > self.memory.capacity() {
            return Err(Error::ProgramTooLarge {
                len: image.len(),
                capacity: self.memory.capacity(),
            });
        }

        self.reset();
        self.memory.zero();
        self.memory.set_block(0, image);

        debug!(
            "Loaded {} words, entry at {:#06x}",
            image.len(),
            self.memory.address(entry)
        );

        self.set_pointer(RegisterName::IP, entry as i64);
        self.notify(RegisterName::SP);

        Ok(())
    }

    pub fn add_listener(&mut self, listener: impl Fn(&PointerEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn register(&self, name: RegisterName) -> &Register {
        &self.registers[name as usize]
    }

    pub fn register_mut(&mut self, name: RegisterName) -> &mut Register {
        &mut self.registers[name as usize]
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.register(RegisterName::FLAGS).value())
    }

    /// Replace the condition bits, leaving the rest of the flags register alone.
    pub fn set_flags(&mut self, flags: Flags) {
        let register = self.register_mut(RegisterName::FLAGS);
        let other = register.value() & !Flags::all().bits();
        register.set_value(other | flags.bits());
    }

    /// The catalog entry that was executed last.
    pub fn last_instruction(&self) -> Option<Entry> {
        self.last_instruction
    }

    /// The value of an operand.
    pub fn retrieve(&self, kind: OperandKind, word: u16) -> Result<u16> {
        let location = self.locate(kind, word)?;
        Ok(self.read(location))
    }

    /// Write an operand. Immediates can not be stored to.
    pub fn store(&mut self, kind: OperandKind, word: u16, value: u16) -> Result<()> {
        let location = self.locate(kind, word)?;
        self.write(location, value)
    }

    pub fn step(&mut self) -> Result<()> {
        let ip = self.register(RegisterName::IP).value();
        let sp = self.register(RegisterName::SP).value();

        let op_code = self.memory.get_word(ip);
        let entry = self.catalog.decode(op_code)?;

        debug!("{:04X}  {}", ip, entry);

        // All operands are resolved before anything is changed.
        let destination = match entry.signature.destination() {
            Some(kind) => Some(self.locate(kind, self.memory.get_word(ip as i64 + 1))?),
            None => None,
        };
        let source = match entry.signature.source() {
            Some(kind) => Some(self.locate(kind, self.memory.get_word(ip as i64 + 2))?),
            None => None,
        };

        let next = match self.execute(entry, destination, source)? {
            Flow::Advance => ip as i64 + 1 + entry.operand_count() as i64,
            Flow::Jump(target) => target as i64,
        };

        self.last_instruction = Some(entry);

        if self.register(RegisterName::SP).value() != sp {
            self.notify(RegisterName::SP);
        }
        self.set_pointer(RegisterName::IP, next);

        Ok(())
    }

    fn execute(
        &mut self,
        entry: Entry,
        destination: Option<Location>,
        source: Option<Location>,
    ) -> Result<Flow> {
        use Operation::*;

        let flags = self.flags();

        match (entry.operation, destination, source) {
            (ADD, Some(d), Some(s)) => self.binary(d, s, calc::add),
            (SUB, Some(d), Some(s)) => self.binary(d, s, calc::sub),
            (AND, Some(d), Some(s)) => self.binary(d, s, |l, r, f| calc::logic(l & r, f)),
            (OR, Some(d), Some(s)) => self.binary(d, s, |l, r, f| calc::logic(l | r, f)),
            (XOR, Some(d), Some(s)) => self.binary(d, s, |l, r, f| calc::logic(l ^ r, f)),
            (SHL, Some(d), Some(s)) => self.binary(d, s, calc::shl),
            (SHR, Some(d), Some(s)) => self.binary(d, s, calc::shr),
            (ROL, Some(d), Some(s)) => self.binary(d, s, calc::rol),
            (ROR, Some(d), Some(s)) => self.binary(d, s, calc::ror),

            (CMP, Some(d), Some(s)) => {
                let mut flags = flags;
                calc::sub(self.read(d), self.read(s), &mut flags);
                self.set_flags(flags);
                Ok(Flow::Advance)
            }

            (MOV, Some(d), Some(s)) => {
                Self::writable(d)?;
                let value = self.read(s);
                self.write(d, value)?;
                Ok(Flow::Advance)
            }

            (INC, Some(d), None) => self.unary(d, calc::inc),
            (DEC, Some(d), None) => self.unary(d, calc::dec),
            (NOT, Some(d), None) => self.unary(d, calc::not),

            (MUL, Some(s), None) => {
                let mut flags = flags;
                let a = self.register(RegisterName::A).value();
                let result = calc::mul(a, self.read(s), &mut flags);
                self.register_mut(RegisterName::A).set_value(result);
                self.set_flags(flags);
                Ok(Flow::Advance)
            }

            (DIV, Some(s), None) => {
                let mut flags = flags;
                let a = self.register(RegisterName::A).value();
                let (quotient, remainder) =
                    calc::div(a, self.read(s), &mut flags).ok_or(Error::DivideByZero)?;
                let register = self.register_mut(RegisterName::A);
                register.set_low(quotient as u8);
                register.set_high(remainder as u8);
                self.set_flags(flags);
                Ok(Flow::Advance)
            }

            (PUSH, Some(s), None) => {
                let value = self.read(s);
                self.push(value);
                Ok(Flow::Advance)
            }

            (POP, Some(d), None) => {
                Self::writable(d)?;
                let value = self.pop();
                self.write(d, value)?;
                Ok(Flow::Advance)
            }

            (PUSHF, None, None) => {
                self.push(self.register(RegisterName::FLAGS).value());
                Ok(Flow::Advance)
            }

            (POPF, None, None) => {
                let value = self.pop();
                self.register_mut(RegisterName::FLAGS).set_value(value);
                Ok(Flow::Advance)
            }

            (PUSHA, None, None) => {
                use RegisterName::{A, B, BP, C, D, DI, SI, SP};

                let sp = self.register(SP).value();
                for name in [A, B, C, D] {
                    self.push(self.register(name).value());
                }
                self.push(sp);
                for name in [BP, SI, DI] {
                    self.push(self.register(name).value());
                }
                Ok(Flow::Advance)
            }

            (POPA, None, None) => {
                use RegisterName::{A, B, BP, C, D, DI, SI};

                for name in [DI, SI, BP] {
                    let value = self.pop();
                    self.register_mut(name).set_value(value);
                }
                // Saved stack pointer.
                self.pop();
                for name in [D, C, B, A] {
                    let value = self.pop();
                    self.register_mut(name).set_value(value);
                }
                Ok(Flow::Advance)
            }

            (JMP, Some(t), None) => Ok(Flow::Jump(self.read(t))),
            (JA, Some(t), None) => {
                Ok(self.jump_if(t, !flags.intersects(Flags::CARRY | Flags::ZERO)))
            }
            (JB, Some(t), None) => Ok(self.jump_if(t, flags.contains(Flags::CARRY))),
            (JE | JZ, Some(t), None) => Ok(self.jump_if(t, flags.contains(Flags::ZERO))),
            (JNE | JNZ, Some(t), None) => Ok(self.jump_if(t, !flags.contains(Flags::ZERO))),

            (NOP, None, None) => Ok(Flow::Advance),

            _ => Err(Error::IllegalInstruction(entry)),
        }
    }

    fn binary(
        &mut self,
        destination: Location,
        source: Location,
        op: impl FnOnce(u16, u16, &mut Flags) -> u16,
    ) -> Result<Flow> {
        Self::writable(destination)?;

        let mut flags = self.flags();
        let result = op(self.read(destination), self.read(source), &mut flags);
        self.set_flags(flags);
        self.write(destination, result)?;

        Ok(Flow::Advance)
    }

    fn unary(
        &mut self,
        destination: Location,
        op: impl FnOnce(u16, &mut Flags) -> u16,
    ) -> Result<Flow> {
        Self::writable(destination)?;

        let mut flags = self.flags();
        let result = op(self.read(destination), &mut flags);
        self.set_flags(flags);
        self.write(destination, result)?;

        Ok(Flow::Advance)
    }

    /// The target is only read when the jump is taken.
    fn jump_if(&self, target: Location, taken: bool) -> Flow {
        if taken {
            Flow::Jump(self.read(target))
        } else {
            Flow::Advance
        }
    }

    fn push(&mut self, value: u16) {
        let sp = self.register(RegisterName::SP).value() as i64 - 1;
        let sp = self.memory.address(sp);
        self.register_mut(RegisterName::SP).set_value(sp);
        self.memory.set_word(sp, value);
    }

    fn pop(&mut self) -> u16 {
        let sp = self.register(RegisterName::SP).value();
        let value = self.memory.get_word(sp);
        let next = self.memory.address(sp as i64 + 1);
        self.register_mut(RegisterName::SP).set_value(next);
        value
    }

    fn locate(&self, kind: OperandKind, word: u16) -> Result<Location> {
        match kind {
            OperandKind::Register => RegisterName::from_encoding(word)
                .map(Location::Register)
                .ok_or(Error::InvalidLocation { kind, word }),
            OperandKind::Direct => Ok(Location::Memory(word)),
            OperandKind::Indirect => Ok(Location::Memory(self.memory.get_word(word))),
            OperandKind::Immediate => Ok(Location::Immediate(word)),
        }
    }

    fn writable(location: Location) -> Result<()> {
        match location {
            Location::Immediate(word) => Err(Error::InvalidLocation {
                kind: OperandKind::Immediate,
                word,
            }),
            _ => Ok(()),
        }
    }

    fn read(&self, location: Location) -> u16 {
        match location {
            Location::Register(name) => self.register(name).value(),
            Location::Memory(address) => self.memory.get_word(address),
            Location::Immediate(value) => value,
        }
    }

    fn write(&mut self, location: Location, value: u16) -> Result<()> {
        Self::writable(location)?;
        match location {
            Location::Register(name) => self.register_mut(name).set_value(value),
            Location::Memory(address) => self.memory.set_word(address, value),
            Location::Immediate(_) => {}
        }
        Ok(())
    }

    /// Set IP or SP wrapped into memory and tell the listeners.
    fn set_pointer(&mut self, name: RegisterName, address: i64) {
        let address = wrap(address, self.memory.capacity() as i64);
        self.register_mut(name).set_value(address);
        self.notify(name);
    }

    fn notify(&self, register: RegisterName) {
        let event = PointerEvent {
            register,
            address: self.register(register).value(),
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }

    /// One line with every register in the given base followed by the condition flags.
    pub fn readout(&self, radix: Radix) -> String {
        macro_rules! do_flag {
            ($name:ident, $char:literal) => {{
                if self.flags().contains(Flags::$name) {
                    $char
                } else {
                    "-"
                }
            }};
        }

        let registers = RegisterName::ALL
            .iter()
            .filter(|name| **name != RegisterName::FLAGS)
            .map(|name| {
                format!(
                    "{}:{}",
                    name.name().to_uppercase(),
                    self.register(*name).render(radix)
                )
            })
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "{} FL:{}{}{}{}{}{}",
            registers,
            do_flag!(CARRY, "C"),
            do_flag!(PARITY, "P"),
            do_flag!(AUX_CARRY, "A"),
            do_flag!(ZERO, "Z"),
            do_flag!(SIGN, "S"),
            do_flag!(TRAP, "T"),
        )
    }
}

impl Display for Processor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.readout(Radix::default()))
    }
}
