use crate::{OperandKind, Operation, Signature};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Index of an entry in the flattened catalog. This is the word the assembler emits for an
/// instruction.
pub type OpCode = u16;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Instruction not found: {mnemonic} {}", display_kinds(.first, .second))]
    InstructionNotFound {
        mnemonic: String,
        first: Option<OperandKind>,
        second: Option<OperandKind>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid op code ({0:#06x})")]
    InvalidOpCode(OpCode),
}

fn display_kinds(first: &Option<OperandKind>, second: &Option<OperandKind>) -> String {
    [first, second]
        .iter()
        .filter_map(|kind| kind.map(|kind| kind.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

use OperandKind::{Direct as Mem, Immediate as Imm, Indirect as DMem, Register as Reg};

const BINARY: &[Signature] = &[
    Signature::DestinationAndSource(Reg, Reg),
    Signature::DestinationAndSource(Reg, Mem),
    Signature::DestinationAndSource(Reg, DMem),
    Signature::DestinationAndSource(Reg, Imm),
    Signature::DestinationAndSource(Mem, Reg),
    Signature::DestinationAndSource(Mem, Mem),
    Signature::DestinationAndSource(Mem, DMem),
    Signature::DestinationAndSource(Mem, Imm),
    Signature::DestinationAndSource(DMem, Reg),
    Signature::DestinationAndSource(DMem, Mem),
    Signature::DestinationAndSource(DMem, DMem),
    Signature::DestinationAndSource(DMem, Imm),
];

const UNARY: &[Signature] = &[
    Signature::Destination(Reg),
    Signature::Destination(Mem),
    Signature::Destination(DMem),
    Signature::Destination(Imm),
];

const UNARY_WRITABLE: &[Signature] = &[
    Signature::Destination(Reg),
    Signature::Destination(Mem),
    Signature::Destination(DMem),
];

const NO_OPERANDS: &[Signature] = &[Signature::None];

impl Operation {
    /// The operand signatures accepted by this operation, in declaration order.
    pub fn signatures(self) -> &'static [Signature] {
        use Operation::*;

        match self {
            ADD | SUB | AND | OR | XOR | CMP | SHL | SHR | ROL | ROR | MOV => BINARY,
            MUL | DIV | PUSH | POP | JMP | JA | JB | JE | JNE | JZ | JNZ => UNARY,
            INC | DEC | NOT => UNARY_WRITABLE,
            PUSHF | PUSHA | POPF | POPA | NOP => NO_OPERANDS,
        }
    }
}

/// A single (operation, signature) pair in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entry {
    pub operation: Operation,
    pub signature: Signature,
}

impl Entry {
    #[inline]
    pub fn operand_count(&self) -> usize {
        self.signature.operand_count()
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.signature {
            Signature::None => write!(f, "{}", self.operation),
            signature => write!(f, "{} {}", self.operation, signature),
        }
    }
}

/// The table of every encodable instruction. The position of an entry in the flattened table is
/// its op code, so the table is built once from a fixed declaration order and never changes.
pub struct InstructionCatalog {
    entries: Vec<Entry>,
    op_codes: HashMap<Entry, OpCode>,
}

static CATALOG: Lazy<InstructionCatalog> = Lazy::new(InstructionCatalog::build);

impl InstructionCatalog {
    /// The process wide catalog.
    pub fn get() -> &'static InstructionCatalog {
        &CATALOG
    }

    fn build() -> Self {
        let entries: Vec<Entry> = Operation::ALL
            .iter()
            .flat_map(|&operation| {
                operation
                    .signatures()
                    .iter()
                    .map(move |&signature| Entry {
                        operation,
                        signature,
                    })
            })
            .collect();

        let op_codes = entries
            .iter()
            .enumerate()
            .map(|(op_code, entry)| (*entry, op_code as OpCode))
            .collect();

        Self { entries, op_codes }
    }

    pub fn signatures(&self, operation: Operation) -> &'static [Signature] {
        operation.signatures()
    }

    /// Every entry, ordered by op code.
    pub fn flatten(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the op code for a mnemonic and its operand kinds. Arity has to match exactly, a
    /// missing kind is not a wildcard.
    pub fn lookup(
        &self,
        mnemonic: &str,
        first: Option<OperandKind>,
        second: Option<OperandKind>,
    ) -> Result<OpCode, LookupError> {
        let not_found = || LookupError::InstructionNotFound {
            mnemonic: mnemonic.to_string(),
            first,
            second,
        };

        let operation = mnemonic.parse::<Operation>().map_err(|_| not_found())?;
        let signature = Signature::from_kinds(first, second).ok_or_else(not_found)?;

        self.encode(Entry {
            operation,
            signature,
        })
        .ok_or_else(not_found)
    }

    pub fn encode(&self, entry: Entry) -> Option<OpCode> {
        self.op_codes.get(&entry).copied()
    }

    pub fn decode(&self, op_code: OpCode) -> Result<Entry, DecodeError> {
        self.entries
            .get(op_code as usize)
            .copied()
            .ok_or(DecodeError::InvalidOpCode(op_code))
    }
}
