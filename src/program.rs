use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tracing::debug;

use crate::check::{Checker, TypeChecker};
use crate::diagnostic::Diagnostic;
use crate::emit::emit_file;
use crate::error::{Error, Result};
use crate::options::CompilerOptions;
use crate::parse::SourceFile;

/// Where a [`Program`] gets its source text from.
pub trait CompilerHost {
    /// Returns the full text of `file_name`.
    fn read_source(&self, file_name: &str) -> Result<String>;

    /// Line terminator for generated code.
    fn new_line(&self) -> &str {
        "\n"
    }
}

/// Reads sources from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskHost;

impl CompilerHost for DiskHost {
    fn read_source(&self, file_name: &str) -> Result<String> {
        std::fs::read_to_string(file_name).map_err(|source| Error::Io {
            path: PathBuf::from(file_name),
            source,
        })
    }
}

/// Serves sources from an in-memory table of file name to content.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    files: HashMap<String, String>,
}

impl MemoryHost {
    /// Creates a host over `files`.
    pub fn new(files: HashMap<String, String>) -> Self {
        Self { files }
    }
}

impl CompilerHost for MemoryHost {
    fn read_source(&self, file_name: &str) -> Result<String> {
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| Error::MissingSource(file_name.to_string()))
    }
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Output file name: the input name with `.ts`/`.tsx` replaced by `.js`.
    pub file_name: String,

    /// Emitted JavaScript.
    pub text: String,

    /// Always `false`; kept for hosts that write files to disk.
    pub write_byte_order_mark: bool,
}

/// Outcome of [`Program::emit`].
#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    /// Diagnostics produced while emitting.
    pub diagnostics: Vec<Diagnostic>,
}

/// A compilation unit: parsed root files, the checker built over them, and their diagnostics.
#[derive(Debug)]
pub struct Program {
    files: Vec<SourceFile>,
    checker: Checker,
    options: CompilerOptions,
    new_line: String,
    diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Parses and checks every file in `root_names`, in order. Repeated names are parsed once.
    pub fn new(root_names: &[String], options: &CompilerOptions, host: &dyn CompilerHost) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(root_names.len());

        for name in root_names {
            if !seen.insert(name.as_str()) {
                debug!(file = name.as_str(), "skipping duplicate root");
                continue;
            }
            files.push(SourceFile::parse(name, host.read_source(name)?)?);
        }

        let checker = Checker::new(&files);
        let mut diagnostics = Vec::new();
        for file in &files {
            diagnostics.extend(file.parse_diagnostics().iter().cloned());
            diagnostics.extend(checker.check_file(file, options));
        }

        debug!(files = files.len(), diagnostics = diagnostics.len(), "created program");

        Ok(Self {
            files,
            checker,
            options: options.clone(),
            new_line: host.new_line().to_string(),
            diagnostics,
        })
    }

    /// The root files, in program order.
    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    /// The type checker for this program.
    pub fn type_checker(&self) -> &dyn TypeChecker {
        &self.checker
    }

    /// The options this program was created with.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Parse and semantic diagnostics for every file.
    pub fn global_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Emits JavaScript for every non-declaration file, handing each output to `write_file` in
    /// program order.
    pub fn emit(&self, write_file: &mut dyn FnMut(EmittedFile)) -> EmitResult {
        let mut result = EmitResult::default();

        for file in self.files.iter().filter(|file| !file.is_declaration_file()) {
            let (text, diagnostics) = emit_file(file, &self.options, &self.new_line);
            result.diagnostics.extend(diagnostics);

            write_file(EmittedFile {
                file_name: output_name(file.name()),
                text,
                write_byte_order_mark: false,
            });
        }

        result
    }
}

fn output_name(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".tsx")
        .or_else(|| file_name.strip_suffix(".ts"))
        .unwrap_or(file_name);
    format!("{}.js", stem)
}
