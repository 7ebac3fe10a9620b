use crate::error::{AssembleError, Result};
use crate::literal::parse_number;
use crate::program::Program;
use crate::source::SourceLine;
use mtc_instruction::{wrap_word, InstructionCatalog, OperandKind, RegisterName};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Keyword that turns a line into a data definition.
pub const DEFINE_WORD: &str = "dw";

/// Suffix that turns the first token of a line into a code label.
pub const LABEL_TERMINATOR: char = ':';

/// Words that can be addressed.
const ADDRESS_SPACE: usize = 0x1_0000;

/// An instruction line with its label removed.
#[derive(Debug)]
struct Statement<'a> {
    line: usize,
    mnemonic: &'a str,
    operands: Vec<&'a str>,
}

/// State of a single program load. Data definitions are pulled out first, then the instructions
/// are assembled in two passes: the first binds every label, the second emits words.
pub struct Assembler {
    catalog: &'static InstructionCatalog,
    data: HashMap<String, u16>,
    labels: HashMap<String, u16>,
    content: Vec<u16>,
    code_start: Option<usize>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            catalog: InstructionCatalog::get(),
            data: HashMap::new(),
            labels: HashMap::new(),
            content: vec![],
            code_start: None,
        }
    }
}

impl Assembler {
    /// The words emitted so far.
    pub fn content(&self) -> &[u16] {
        &self.content
    }

    pub fn data_symbol(&self, name: &str) -> Option<u16> {
        self.data.get(name).copied()
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    /// Remove every data definition from `lines`, binding its name to the current end of the
    /// content and appending its values. Returns the lines that are left.
    pub fn extract_data_definitions(&mut self, lines: Vec<SourceLine>) -> Result<Vec<SourceLine>> {
        let mut remaining = Vec::with_capacity(lines.len());

        for line in lines {
            match line.tokens().position(|token| token == DEFINE_WORD) {
                Some(position) => {
                    let tokens: Vec<&str> = line.tokens().collect();
                    self.define_words(line.index, &tokens, position)?;
                }
                None => remaining.push(line),
            }
        }

        Ok(remaining)
    }

    fn define_words(&mut self, line: usize, tokens: &[&str], position: usize) -> Result<()> {
        if position != 1 {
            return Err(AssembleError::InvalidName {
                token: tokens[..position.max(1)].join(" "),
                line,
            });
        }

        let name = tokens[0];
        check_name(name, line, &self.data)?;

        let values = tokens[position + 1..]
            .iter()
            .map(|token| {
                parse_number(token)
                    .map(wrap_word)
                    .ok_or_else(|| AssembleError::InvalidLiteral {
                        token: token.to_string(),
                        line,
                    })
            })
            .collect::<Result<Vec<u16>>>()?;

        let address = self.offset(line)?;
        if self.content.len() + values.len() > ADDRESS_SPACE {
            return Err(AssembleError::ProgramTooLarge { line });
        }

        if values.is_empty() {
            warn!("Data definition \"{}\" has no values (line {})", name, line);
        }
        debug!("Data \"{}\" at {:#06x} ({} words)", name, address, values.len());

        self.data.insert(name.to_string(), address);
        self.content.extend(values);

        Ok(())
    }

    /// Assemble the instruction lines and append them to the content. Returns only the words
    /// emitted for the instructions.
    pub fn assemble(&mut self, lines: &[SourceLine]) -> Result<Vec<u16>> {
        let (statements, pending) = self.bind_labels(lines);

        // Lines before a first pass failure still report their own errors first.
        let mut words = vec![];
        for statement in &statements {
            if matches!(&pending, Some(err) if err.line() < statement.line) {
                break;
            }
            words.extend(self.encode(statement)?);
        }

        if let Some(err) = pending {
            return Err(err);
        }

        self.code_start = Some(self.content.len());
        self.content.extend_from_slice(&words);

        Ok(words)
    }

    /// First pass. Instruction sizes only depend on the operand count, so every label can be
    /// bound before any operand is resolved. Binding carries on past a bad line so later labels
    /// stay known; only the first failure is kept.
    fn bind_labels<'a>(
        &mut self,
        lines: &'a [SourceLine],
    ) -> (Vec<Statement<'a>>, Option<AssembleError>) {
        let mut offset = self.content.len();
        let mut statements = vec![];
        let mut pending = None;

        for line in lines {
            match self.bind_line(line, &mut offset) {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {}
                Err(err) => {
                    pending.get_or_insert(err);
                }
            }
        }

        (statements, pending)
    }

    fn bind_line<'a>(
        &mut self,
        line: &'a SourceLine,
        offset: &mut usize,
    ) -> Result<Option<Statement<'a>>> {
        let mut tokens: Vec<&str> = line.tokens().collect();

        if let Some(label) = tokens
            .first()
            .and_then(|token| token.strip_suffix(LABEL_TERMINATOR))
        {
            check_name(label, line.index, &self.labels)?;
            let address = u16::try_from(*offset)
                .map_err(|_| AssembleError::ProgramTooLarge { line: line.index })?;
            debug!("Label \"{}\" at {:#06x}", label, address);
            self.labels.insert(label.to_string(), address);
            tokens.remove(0);
        }

        let (mnemonic, operands) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(None),
        };

        if operands.len() > 2 {
            return Err(AssembleError::TooManyOperands {
                token: mnemonic.to_string(),
                line: line.index,
            });
        }

        *offset += 1 + operands.len();
        if *offset > ADDRESS_SPACE {
            return Err(AssembleError::ProgramTooLarge { line: line.index });
        }

        Ok(Some(Statement {
            line: line.index,
            mnemonic: *mnemonic,
            operands: operands.to_vec(),
        }))
    }

    /// Second pass for a single statement: op code followed by the operand words.
    fn encode(&self, statement: &Statement) -> Result<Vec<u16>> {
        let operands = statement
            .operands
            .iter()
            .map(|token| self.classify(token, statement.line))
            .collect::<Result<Vec<_>>>()?;

        let kind = |i: usize| operands.get(i).map(|(kind, _)| *kind);

        let op_code = self
            .catalog
            .lookup(statement.mnemonic, kind(0), kind(1))
            .map_err(|source| AssembleError::InstructionNotFound {
                token: statement.mnemonic.to_string(),
                line: statement.line,
                source,
            })?;

        let mut words = Vec::with_capacity(1 + operands.len());
        words.push(op_code);
        words.extend(operands.iter().map(|(_, word)| *word));

        Ok(words)
    }

    /// Decide what an operand token refers to. The checks run in a fixed order: register,
    /// bracketed data symbol, number, data symbol, label.
    fn classify(&self, token: &str, line: usize) -> Result<(OperandKind, u16)> {
        if let Ok(register) = token.parse::<RegisterName>() {
            return Ok((OperandKind::Register, register.encoding()));
        }

        if let Some(name) = token
            .strip_prefix('[')
            .and_then(|token| token.strip_suffix(']'))
        {
            return match self.data.get(name) {
                Some(address) => Ok((OperandKind::Indirect, *address)),
                None => Err(AssembleError::UnknownSymbol {
                    token: name.to_string(),
                    line,
                }),
            };
        }

        if let Some(value) = parse_number(token) {
            return Ok((OperandKind::Immediate, wrap_word(value)));
        }

        if let Some(address) = self.data.get(token) {
            return Ok((OperandKind::Direct, *address));
        }

        if let Some(address) = self.labels.get(token) {
            return Ok((OperandKind::Immediate, *address));
        }

        Err(AssembleError::UnresolvedOperand {
            token: token.to_string(),
            line,
        })
    }

    fn offset(&self, line: usize) -> Result<u16> {
        u16::try_from(self.content.len()).map_err(|_| AssembleError::ProgramTooLarge { line })
    }

    pub fn finish(self) -> Program {
        let data_len = self.code_start.unwrap_or(self.content.len());
        Program::new(self.content, data_len, self.data, self.labels)
    }
}

fn check_name(name: &str, line: usize, existing: &HashMap<String, u16>) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid {
        return Err(AssembleError::InvalidName {
            token: name.to_string(),
            line,
        });
    }

    if name.parse::<RegisterName>().is_ok() {
        return Err(AssembleError::ReservedName {
            token: name.to_string(),
            line,
        });
    }

    if existing.contains_key(name) {
        return Err(AssembleError::DuplicateSymbol {
            token: name.to_string(),
            line,
        });
    }

    Ok(())
}
