use mtc_instruction::{DecodeError, Entry, OperandKind};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Bit position {0} is out of range (0..=15)")]
    BitRange(u32),

    #[error("Could not decode instruction! {0}")]
    Decode(#[from] DecodeError),

    /// Storing to an immediate, or a register operand that names no register.
    #[error("Invalid location! ({kind} {word:#06x})")]
    InvalidLocation { kind: OperandKind, word: u16 },

    #[error("Division by zero!")]
    DivideByZero,

    #[error("Invalid memory capacity ({0})")]
    InvalidCapacity(usize),

    #[error("Program of {len} words does not fit in {capacity} words of memory")]
    ProgramTooLarge { len: usize, capacity: usize },

    #[error("Illegal instruction! ({0})")]
    IllegalInstruction(Entry),
}

pub type Result<T> = std::result::Result<T, Error>;
