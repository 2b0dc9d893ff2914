use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsConfig};
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};

/// A parsed input file: its text and the syntax tree over it.
///
/// The text is never modified. Rewriting a file means producing new text and parsing that
/// into a new [`SourceFile`].
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    text: String,
    module: Module,
    start_pos: BytePos,
    diagnostics: Vec<Diagnostic>,
}

impl SourceFile {
    /// Parses `text` as TypeScript. Files ending in `.d.ts` are parsed as declaration files.
    ///
    /// Recoverable syntax errors are kept as [`Diagnostic`]s; an error the parser cannot recover
    /// from is returned as [`Error::Parse`].
    pub fn parse(name: &str, text: String) -> Result<Self> {
        let cm = Lrc::<SourceMap>::default();
        let fm = cm.new_source_file(FileName::Custom(name.to_string()), text.clone());

        let lexer = Lexer::new(
            Syntax::Typescript(TsConfig {
                dts: is_declaration_file(name),
                ..Default::default()
            }),
            EsVersion::Es2022,
            StringInput::from(&*fm),
            None,
        );

        let mut parser = Parser::new_from(lexer);
        let result = parser.parse_module();
        let start_pos = fm.start_pos;

        let locate = |span: Span| (span.lo.0.saturating_sub(start_pos.0)) as usize;

        let module = result.map_err(|e| Error::Parse {
            file: name.to_string(),
            message: Diagnostic::new(name, &text, locate(e.span()), 0, e.kind().msg()).to_string(),
        })?;

        let diagnostics = parser
            .take_errors()
            .into_iter()
            .map(|e| Diagnostic::new(name, &text, locate(e.span()), 0, e.kind().msg()))
            .collect::<Vec<_>>();

        debug!(file = name, items = module.body.len(), errors = diagnostics.len(), "parsed");

        Ok(Self {
            name: name.to_string(),
            text,
            module,
            start_pos,
            diagnostics,
        })
    }

    /// The file name this source was parsed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full original text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The syntax tree.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Syntax errors the parser recovered from.
    pub fn parse_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether this is a `.d.ts` file, which has nothing to emit.
    pub fn is_declaration_file(&self) -> bool {
        is_declaration_file(&self.name)
    }

    /// Byte offset of `pos` into [`SourceFile::text`].
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0.saturating_sub(self.start_pos.0) as usize).min(self.text.len())
    }

    /// Byte offset where `node` starts.
    pub fn start(&self, node: &impl Spanned) -> usize {
        self.offset(node.span().lo)
    }

    /// Byte offset just past the end of `node`.
    pub fn end(&self, node: &impl Spanned) -> usize {
        self.offset(node.span().hi)
    }

    /// The text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        let lo = self.offset(span.lo);
        let hi = self.offset(span.hi).max(lo);
        &self.text[lo..hi]
    }

    /// Creates a diagnostic positioned at `span`.
    pub fn diagnostic(&self, span: Span, code: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(&self.name, &self.text, self.offset(span.lo), code, message)
    }
}

fn is_declaration_file(name: &str) -> bool {
    name.ends_with(".d.ts")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    use super::*;

    #[test]
    fn offsets_index_the_original_text() {
        let file = SourceFile::parse("a.ts", "let a = 1;\nclass Point {}\n".to_string()).unwrap();

        let ModuleItem::Stmt(Stmt::Decl(Decl::Class(class))) = &file.module().body[1] else {
            panic!("expected a class declaration");
        };

        assert_eq!(file.start(&class.class.span), 11);
        assert_eq!(file.snippet(class.class.span), "class Point {}");
        assert_eq!(file.snippet(class.ident.span), "Point");
    }

    #[test]
    fn type_syntax_is_accepted() {
        let file = SourceFile::parse(
            "a.ts",
            "function f(x: number, y?: Array<string>): void {}\ninterface I { a: string }".to_string(),
        )
        .unwrap();

        assert!(file.parse_diagnostics().is_empty());
        assert_eq!(file.module().body.len(), 2);
    }

    #[test]
    fn fatal_errors_are_reported() {
        let err = SourceFile::parse("broken.ts", "let x = ;".to_string()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref file, .. } if file == "broken.ts"));
    }

    #[test]
    fn declaration_files() {
        let file = SourceFile::parse("lib.d.ts", "declare function f(): void;".to_string()).unwrap();
        assert!(file.is_declaration_file());
    }
}
