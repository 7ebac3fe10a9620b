use mtc_instruction::LookupError;

/// Everything that can abort an assembly. Each variant carries the 0-based index of the source
/// line it was found on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    /// A bracketed operand names something that is not a data symbol.
    #[error("Unrecognized symbol \"{token}\"")]
    UnknownSymbol { token: String, line: usize },

    /// An operand is not a register, number, data symbol or label.
    #[error("Unrecognized operand \"{token}\"")]
    UnresolvedOperand { token: String, line: usize },

    /// No catalog entry matches the mnemonic and the kinds of its operands.
    #[error("{source}")]
    InstructionNotFound {
        token: String,
        line: usize,
        source: LookupError,
    },

    #[error("Invalid literal \"{token}\"")]
    InvalidLiteral { token: String, line: usize },

    #[error("Invalid symbol name \"{token}\"")]
    InvalidName { token: String, line: usize },

    #[error("\"{token}\" is already defined")]
    DuplicateSymbol { token: String, line: usize },

    #[error("\"{token}\" is a register and can not be used as a symbol")]
    ReservedName { token: String, line: usize },

    #[error("Too many operands for \"{token}\"")]
    TooManyOperands { token: String, line: usize },

    #[error("Program does not fit in the address space")]
    ProgramTooLarge { line: usize },
}

impl AssembleError {
    pub fn line(&self) -> usize {
        match self {
            AssembleError::UnknownSymbol { line, .. }
            | AssembleError::UnresolvedOperand { line, .. }
            | AssembleError::InstructionNotFound { line, .. }
            | AssembleError::InvalidLiteral { line, .. }
            | AssembleError::InvalidName { line, .. }
            | AssembleError::DuplicateSymbol { line, .. }
            | AssembleError::ReservedName { line, .. }
            | AssembleError::TooManyOperands { line, .. }
            | AssembleError::ProgramTooLarge { line } => *line,
        }
    }

    /// The offending token, if the error points at one.
    pub fn token(&self) -> Option<&str> {
        match self {
            AssembleError::UnknownSymbol { token, .. }
            | AssembleError::UnresolvedOperand { token, .. }
            | AssembleError::InstructionNotFound { token, .. }
            | AssembleError::InvalidLiteral { token, .. }
            | AssembleError::InvalidName { token, .. }
            | AssembleError::DuplicateSymbol { token, .. }
            | AssembleError::ReservedName { token, .. }
            | AssembleError::TooManyOperands { token, .. } => Some(token.as_str()),
            AssembleError::ProgramTooLarge { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssembleError>;
