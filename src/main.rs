//! `annoc`: annotates TypeScript declarations with JSDoc types, compiles them, and prints
//! wrapper-free JavaScript to standard output.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::info;

use annoc::driver::compile;
use annoc::init_tracing;
use annoc::options::{CompilerOptions, ModuleKind, ProjectConfig, ScriptTarget};
use annoc::program::DiskHost;

#[derive(Parser)]
#[command(name = "annoc")]
#[command(about = "Annotate TypeScript with JSDoc types and emit unwrapped JavaScript")]
#[command(version)]
struct Cli {
    /// Project file whose compiler options and files are used
    #[arg(short, long, value_name = "TSCONFIG")]
    project: Option<PathBuf>,

    /// Output module format (commonjs, es2015)
    #[arg(long, value_name = "KIND")]
    module: Option<ModuleKind>,

    /// Output language level (es3, es5, es2015, ...)
    #[arg(long, value_name = "LEVEL")]
    target: Option<ScriptTarget>,

    /// Report parameters and properties that implicitly have an `any` type
    #[arg(long = "noImplicitAny", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    no_implicit_any: Option<bool>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input files, compiled after the project's files
    files: Vec<String>,
}

fn project_files(path: &Path, project: &ProjectConfig) -> Vec<String> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    project
        .files
        .iter()
        .map(|file| dir.join(file).to_string_lossy().into_owned())
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (mut options, mut files) = match &cli.project {
        Some(path) => {
            let project = ProjectConfig::from_file(path)?;
            let options = project
                .compiler_options()
                .with_context(|| format!("invalid compiler options in `{}`", path.display()))?;
            (options, project_files(path, &project))
        }
        None => (CompilerOptions::default(), Vec::new()),
    };

    if let Some(module) = cli.module {
        options.module = module;
    }
    if let Some(target) = cli.target {
        options.target = target;
    }
    if let Some(no_implicit_any) = cli.no_implicit_any {
        options.no_implicit_any = no_implicit_any;
    }
    files.extend(cli.files);

    if files.is_empty() {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "no input files")
            .exit();
    }

    info!(files = files.len(), module = %options.module, target = %options.target, "compiling");
    let outputs = compile(&files, &options, &DiskHost)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for output in outputs {
        out.write_all(output.text.as_bytes())
            .with_context(|| format!("failed to write `{}`", output.file_name))?;
    }
    out.flush()?;

    Ok(())
}
