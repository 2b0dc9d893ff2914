use std::fmt::Display;

/// A compiler diagnostic: a parse or type error found in an input file.
///
/// Diagnostics never stop the pipeline; they are logged and emission continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the diagnostic belongs to.
    pub file_name: String,

    /// One-based line of the reported position.
    pub line: usize,

    /// One-based column (in characters) of the reported position.
    pub column: usize,

    /// TypeScript-compatible diagnostic code (`0` for parser and emitter messages).
    pub code: u32,

    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic at byte `offset` of `text`.
    pub fn new(file_name: &str, text: &str, offset: usize, code: u32, message: impl Into<String>) -> Self {
        let offset = offset.min(text.len());
        let before = text.get(..offset).unwrap_or(text);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };

        Self {
            file_name: file_name.to_string(),
            line,
            column,
            code,
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({},{}): error", self.file_name, self.line, self.column)?;
        if self.code != 0 {
            write!(f, " TS{}", self.code)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn position_is_one_based() {
        let text = "class A {\n  x: Foo;\n}";
        let offset = text.find("Foo").unwrap();
        let diagnostic = Diagnostic::new("a.ts", text, offset, 2304, "Cannot find name 'Foo'.");

        assert_eq!((diagnostic.line, diagnostic.column), (2, 6));
        assert_eq!(diagnostic.to_string(), "a.ts(2,6): error TS2304: Cannot find name 'Foo'.");
    }

    #[test]
    fn code_zero_is_omitted() {
        let diagnostic = Diagnostic::new("a.ts", "", 10, 0, "Unexpected eof");
        assert_eq!(diagnostic.to_string(), "a.ts(1,1): error: Unexpected eof");
    }
}
