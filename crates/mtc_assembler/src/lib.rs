mod assembler;
pub mod diagnostics;
mod error;
mod literal;
mod program;
mod source;

pub use assembler::{Assembler, DEFINE_WORD, LABEL_TERMINATOR};
pub use error::{AssembleError, Result};
pub use literal::parse_number;
pub use program::Program;
pub use source::{normalize, SourceLine};

/// Assemble `source` into a program image. Data definitions are placed first, followed by the
/// encoded instructions.
pub fn load(source: &str) -> Result<Program> {
    let mut assembler = Assembler::default();

    let lines = assembler.extract_data_definitions(normalize(source))?;
    let code = assembler.assemble(&lines)?;

    tracing::debug!("Assembled {} instruction words", code.len());

    Ok(assembler.finish())
}
