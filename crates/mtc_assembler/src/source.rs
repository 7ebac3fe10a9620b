/// A line of source that survived normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    /// 0-based index of the line in the original source text.
    pub index: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn tokens(&self) -> std::str::SplitWhitespace<'_> {
        self.text.split_whitespace()
    }
}

/// Lower case the source, strip comments, turn a quoted string into its character codes, drop
/// commas and leave out lines that end up empty.
pub fn normalize(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.to_lowercase();
            let line = expand_string_literal(strip_comment(&line));
            let text = line.replace(',', " ");
            let text = text.trim();

            if text.is_empty() {
                None
            } else {
                Some(SourceLine::new(index, text))
            }
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Everything between the first and the last quote is one literal.
fn expand_string_literal(line: &str) -> String {
    let (start, end) = match (line.find('\''), line.rfind('\'')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return line.to_string(),
    };

    let codes = line[start + 1..end]
        .chars()
        .map(|c| (c as u32).to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!("{} {} {}", &line[..start], codes, &line[end + 1..])
}
