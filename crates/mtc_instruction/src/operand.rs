use std::fmt::{Display, Formatter};

/// Where the value of an operand lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// The operand word is the encoding of a register.
    Register,
    /// The operand word is a memory address.
    Direct,
    /// The operand word is the address of a memory cell holding the address of the value.
    Indirect,
    /// The operand word is the value itself.
    Immediate,
}

impl Display for OperandKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandKind::Register => write!(f, "reg"),
            OperandKind::Direct => write!(f, "mem"),
            OperandKind::Indirect => write!(f, "dmem"),
            OperandKind::Immediate => write!(f, "imm"),
        }
    }
}

/// The ordered operand kinds an instruction is encoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signature {
    None,
    Destination(OperandKind),
    DestinationAndSource(OperandKind, OperandKind),
}

impl Signature {
    /// Build a signature from up to two kinds. A second kind without a first one has no
    /// signature.
    pub fn from_kinds(first: Option<OperandKind>, second: Option<OperandKind>) -> Option<Self> {
        match (first, second) {
            (None, None) => Some(Signature::None),
            (Some(destination), None) => Some(Signature::Destination(destination)),
            (Some(destination), Some(source)) => {
                Some(Signature::DestinationAndSource(destination, source))
            }
            (None, Some(_)) => None,
        }
    }

    pub fn operand_count(&self) -> usize {
        match self {
            Signature::None => 0,
            Signature::Destination(_) => 1,
            Signature::DestinationAndSource(_, _) => 2,
        }
    }

    pub fn destination(&self) -> Option<OperandKind> {
        match self {
            Signature::None => None,
            Signature::Destination(kind) | Signature::DestinationAndSource(kind, _) => Some(*kind),
        }
    }

    pub fn source(&self) -> Option<OperandKind> {
        match self {
            Signature::DestinationAndSource(_, kind) => Some(*kind),
            _ => None,
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Signature::None => Ok(()),
            Signature::Destination(destination) => write!(f, "{}", destination),
            Signature::DestinationAndSource(destination, source) => {
                write!(f, "{}, {}", destination, source)
            }
        }
    }
}
