use std::path::PathBuf;

/// Errors that stop the annotation pipeline.
///
/// Compiler diagnostics are not errors: they are reported and the pipeline keeps going.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source or configuration file could not be read.
    #[error("failed to read `{}`", path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parser gave up on a file and produced no syntax tree.
    #[error("{file}: {message}")]
    Parse {
        /// The file that failed to parse.
        file: String,

        /// The parser's description of the failure.
        message: String,
    },

    /// A project configuration file is not valid JSON of the expected shape.
    #[error("invalid project configuration `{}`: {source}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,

        /// The deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A recognized compiler option carries a value we cannot interpret.
    #[error("invalid value `{value}` for compiler option `{option}`")]
    InvalidOption {
        /// The option name as written in the configuration.
        option: &'static str,

        /// The offending value.
        value: String,
    },

    /// A compilation unit asked its host for a file the host does not know.
    #[error("source file `{0}` is not available to the compiler host")]
    MissingSource(String),
}

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
