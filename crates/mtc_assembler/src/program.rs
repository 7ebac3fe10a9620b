use mtc_instruction::wrap_word;
use std::collections::HashMap;

/// An assembled program: the data words followed by the encoded instructions, meant to be written
/// to memory starting at address 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    image: Vec<u16>,
    data_len: usize,
    data: HashMap<String, u16>,
    labels: HashMap<String, u16>,
}

impl Program {
    pub(crate) fn new(
        image: Vec<u16>,
        data_len: usize,
        data: HashMap<String, u16>,
        labels: HashMap<String, u16>,
    ) -> Self {
        Self {
            image,
            data_len,
            data,
            labels,
        }
    }

    /// The complete image, data first.
    pub fn image(&self) -> &[u16] {
        &self.image
    }

    /// Address of the first instruction.
    pub fn entry(&self) -> u16 {
        wrap_word(self.data_len as i64)
    }

    /// The data words.
    pub fn data(&self) -> &[u16] {
        &self.image[..self.data_len]
    }

    /// The encoded instruction stream.
    pub fn code(&self) -> &[u16] {
        &self.image[self.data_len..]
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn data_symbol(&self, name: &str) -> Option<u16> {
        self.data.get(name).copied()
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    /// Data symbols ordered by address.
    pub fn data_symbols(&self) -> Vec<(&str, u16)> {
        sorted(&self.data)
    }

    /// Labels ordered by address.
    pub fn labels(&self) -> Vec<(&str, u16)> {
        sorted(&self.labels)
    }
}

fn sorted(symbols: &HashMap<String, u16>) -> Vec<(&str, u16)> {
    let mut symbols: Vec<_> = symbols
        .iter()
        .map(|(name, address)| (name.as_str(), *address))
        .collect();
    symbols.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
    symbols
}
