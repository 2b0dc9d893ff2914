//! Prints a project file's compiler options and files as `annoc` command-line arguments, one
//! per line.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use annoc::options::ProjectConfig;

#[derive(Parser)]
#[command(name = "tsconfig-to-args")]
#[command(about = "Convert a tsconfig.json into command-line arguments")]
struct Args {
    /// Project file to convert
    #[arg(default_value = "tsconfig.json")]
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let project = ProjectConfig::from_file(&args.path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for arg in project.to_args() {
        writeln!(out, "{}", arg)?;
    }

    Ok(())
}
