#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Formats type descriptors in the JSDoc type dialect.
pub mod format;

/// Builds the annotation blocks and member declarations that get spliced into a source file.
pub mod jsdoc;

/// Walks a source file and computes the insertions that annotate it, see [`annotate::annotate`].
pub mod annotate;

/// Applies a list of insertions to a text.
pub mod splice;

/// Runs the annotate, recompile, and unwrap pipeline.
pub mod driver;

/// Strips the module wrapper the emitter puts around marked classes.
pub mod unwrap;

/// Parses TypeScript source with [`swc_ecma_parser`] into a [`parse::SourceFile`] that maps syntax back to byte offsets.
pub mod parse;

/// Resolves the declared and inferred types of declarations, and reports semantic diagnostics.
pub mod check;

/// The type descriptors [`check`] produces and [`format`] consumes.
pub mod types;

/// Compilation units over a set of source files, and the hosts they read from.
pub mod program;

/// Turns a parsed TypeScript file into JavaScript by patching its text.
pub mod emit;

/// Compiler diagnostics.
pub mod diagnostic;

/// Compiler options and `tsconfig.json` project files.
pub mod options;

/// The crate's error type.
pub mod error;

/// Private crate for testing utilities.
#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// Installs a [`tracing`] subscriber that writes to standard error.
///
/// `RUST_LOG` takes precedence; otherwise the level is `warn`, raised to `info` by one `-v` and
/// to `debug` by more.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default = match verbosity {
        0 => "annoc=warn",
        1 => "annoc=info",
        _ => "annoc=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
