pub mod cpu;
pub mod error;
pub mod memory;
pub mod register;

pub use cpu::{Flags, PointerEvent, Processor};
pub use error::{Error, Result};
pub use memory::{wrap, Access, Memory, MemoryEvent, DEFAULT_CAPACITY};
pub use register::{Radix, Register};
