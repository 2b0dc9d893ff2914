use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::annotate::annotate;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::options::CompilerOptions;
use crate::program::{CompilerHost, EmittedFile, MemoryHost, Program};
use crate::unwrap::unwrap;

/// Runs the whole pipeline over `file_names`: annotate every file, compile the annotated text,
/// and unwrap what the compiler emits.
///
/// Diagnostics are logged and never stop the pipeline. Only failing to read or parse an input
/// is an error.
pub fn compile(file_names: &[String], options: &CompilerOptions, host: &dyn CompilerHost) -> Result<Vec<EmittedFile>> {
    let original = Program::new(file_names, options, host)?;
    report("input", original.global_diagnostics());

    let annotated: HashMap<String, String> = original
        .source_files()
        .iter()
        .map(|file| (file.name().to_string(), annotate(file, original.type_checker())))
        .collect();
    debug!(files = annotated.len(), "annotated");

    let roots: Vec<String> = original.source_files().iter().map(|file| file.name().to_string()).collect();
    let annotated = Program::new(&roots, options, &MemoryHost::new(annotated))?;
    report("annotated", annotated.global_diagnostics());

    let mut outputs = Vec::new();
    let result = annotated.emit(&mut |file| outputs.push(file));
    report("emit", &result.diagnostics);

    Ok(outputs
        .into_iter()
        .map(|file| EmittedFile {
            text: unwrap(&file.text),
            ..file
        })
        .collect())
}

fn report(stage: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.code {
            0 => warn!(stage, "{}", diagnostic),
            _ => error!(stage, "{}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_one(source: &str) -> String {
        let host = MemoryHost::new(HashMap::from([("a.ts".to_string(), source.to_string())]));
        let mut outputs = compile(&["a.ts".to_string()], &CompilerOptions::default(), &host).unwrap();
        assert_eq!(outputs.len(), 1);
        outputs.remove(0).text
    }

    #[test]
    fn unwraps_exported_classes() {
        let out = compile_one("class Counter {\n  count: number;\n}\nexport = Counter;\n");

        assert!(out.contains("/** @type {number} */\nthis.count;"));
        assert!(out.contains("function Counter()"));
        assert!(!out.contains("(function () {"));
        assert!(!out.contains("module.exports"));
        assert!(!out.contains("__UNWRAP"));
    }

    #[test]
    fn diagnostics_do_not_stop_emission() {
        let out = compile_one("function f(a) { return a; }\nlet x: Unknown = f(1);");
        assert!(out.contains("function f(a)"));
        assert!(out.contains("var x = f(1);"));
    }

    #[test]
    fn output_keeps_program_order() {
        let host = MemoryHost::new(HashMap::from([
            ("b.ts".to_string(), "const b = 2;".to_string()),
            ("a.ts".to_string(), "const a = 1;".to_string()),
        ]));
        let outputs = compile(&["b.ts".to_string(), "a.ts".to_string()], &CompilerOptions::default(), &host).unwrap();
        let names: Vec<&str> = outputs.iter().map(|file| file.file_name.as_str()).collect();

        assert_eq!(names, vec!["b.js", "a.js"]);
    }
}
