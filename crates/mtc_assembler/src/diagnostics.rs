use crate::error::AssembleError;

#[repr(u8)]
pub enum DiagnosticKind {
    Info,
    Warning,
    Error,
}

struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    line: usize,
    token: Option<String>,
}

/// Collects messages about a source file and prints each one with the line it points at.
#[derive(Default)]
pub struct Diagnostics<'a> {
    source: &'a str,
    path: String,

    diags: Vec<Diagnostic>,
}

impl<'a> Diagnostics<'a> {
    pub fn new(source: &'a str, path: String) -> Self {
        Self {
            source,
            path,
            diags: vec![],
        }
    }

    pub fn diag(
        &mut self,
        kind: DiagnosticKind,
        message: impl ToString,
        line: usize,
        token: Option<&str>,
    ) {
        self.diags.push(Diagnostic {
            kind,
            message: message.to_string(),
            line,
            token: token.map(str::to_string),
        });
    }

    pub fn info(&mut self, message: impl ToString, line: usize, token: Option<&str>) {
        self.diag(DiagnosticKind::Info, message, line, token);
    }

    pub fn warn(&mut self, message: impl ToString, line: usize, token: Option<&str>) {
        self.diag(DiagnosticKind::Warning, message, line, token);
    }

    pub fn error(&mut self, message: impl ToString, line: usize, token: Option<&str>) {
        self.diag(DiagnosticKind::Error, message, line, token);
    }

    /// Record an assembly failure as an error.
    pub fn report(&mut self, err: &AssembleError) {
        self.error(err, err.line(), err.token());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn print<W: std::io::Write>(&self, output: &mut W) -> Result<(), std::io::Error> {
        for diag in &self.diags {
            let message = match diag.kind {
                DiagnosticKind::Info => format!("INFO: {}", &diag.message),
                DiagnosticKind::Warning => format!("WARNING: {}", &diag.message),
                DiagnosticKind::Error => format!("ERROR: {}", &diag.message),
            };

            self.print_source_line(output, diag, message.as_str())?;
        }

        Ok(())
    }

    fn print_source_line<W: std::io::Write>(
        &self,
        output: &mut W,
        diag: &Diagnostic,
        message: &str,
    ) -> Result<(), std::io::Error> {
        let fragment = self
            .source
            .lines()
            .nth(diag.line)
            .unwrap_or_default()
            .trim_end_matches('\r');

        // Tokens are lower cased during assembly, so search the same way.
        let (column, width) = diag
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .and_then(|token| {
                find_token(&fragment.to_lowercase(), token).map(|column| (column, token.len()))
            })
            .unwrap_or((0, 1));

        writeln!(
            output,
            "{}:{}:{}: {}",
            self.path,
            diag.line + 1,
            column + 1,
            message
        )?;

        writeln!(output, "{}", fragment)?;
        for _ in 0..column {
            write!(output, " ")?;
        }
        for _ in 0..width {
            write!(output, "^")?;
        }
        writeln!(output)
    }
}

/// Byte offset of the first occurrence of `token` in `line` that is not part of a longer name.
fn find_token(line: &str, token: &str) -> Option<usize> {
    let is_name = |c: char| c.is_alphanumeric() || c == '_';

    line.match_indices(token)
        .map(|(column, _)| column)
        .find(|&column| {
            let before = line[..column].chars().next_back();
            let after = line[column + token.len()..].chars().next();
            !before.map_or(false, is_name) && !after.map_or(false, is_name)
        })
}
