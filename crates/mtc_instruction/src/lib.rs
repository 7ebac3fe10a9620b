//! This crate holds the types shared by the assembler and the emulator: register names, operand
//! kinds, operations and the catalog that turns (operation, signature) pairs into op codes.

mod catalog;
mod operand;
mod operation;
mod register;

pub use catalog::{DecodeError, Entry, InstructionCatalog, LookupError, OpCode};
pub use operand::{OperandKind, Signature};
pub use operation::Operation;
pub use register::RegisterName;

/// The number of distinct values a word can hold.
pub const WORD_MODULUS: i64 = 0x1_0000;

/// Normalize `value` into `[0, modulus)` by repeatedly adding or subtracting `modulus`.
///
/// Every address and every stored value in the system goes through this function, so an address
/// of `-1` in a memory of 1024 cells is cell 1023, and a value of 65536 is stored as 0.
#[inline]
pub fn wrap(value: i64, modulus: i64) -> i64 {
    debug_assert!(modulus > 0);
    value.rem_euclid(modulus)
}

/// Wrap `value` into a 16-bit word.
#[inline]
pub fn wrap_word(value: i64) -> u16 {
    wrap(value, WORD_MODULUS) as u16
}
