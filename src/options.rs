use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Output module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ModuleKind {
    /// `require`/`module.exports`. This is what produces the wrapper idiom the unwrapper strips.
    #[default]
    CommonJs,

    /// ECMAScript `import`/`export` syntax is kept.
    Es2015,
}

impl FromStr for ModuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "commonjs" => Ok(ModuleKind::CommonJs),
            "none" | "amd" | "umd" | "system" => {
                debug!(module = s, "lowering module format to commonjs");
                Ok(ModuleKind::CommonJs)
            }
            "es6" | "es2015" | "es2020" | "es2022" | "esnext" | "node16" | "nodenext" => {
                Ok(ModuleKind::Es2015)
            }
            _ => Err(Error::InvalidOption {
                option: "module",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ModuleKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleKind::CommonJs => write!(f, "commonjs"),
            ModuleKind::Es2015 => write!(f, "es2015"),
        }
    }
}

/// Output language level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ScriptTarget {
    /// ECMAScript 3.
    Es3,

    /// ECMAScript 5. Classes are lowered to constructor functions.
    #[default]
    Es5,

    /// ECMAScript 2015 and later. Classes are kept.
    Es2015,
}

impl ScriptTarget {
    /// Whether `class` syntax must be lowered to constructor functions.
    pub fn lowers_classes(self) -> bool {
        self < ScriptTarget::Es2015
    }
}

impl FromStr for ScriptTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "es3" => Ok(ScriptTarget::Es3),
            "es5" => Ok(ScriptTarget::Es5),
            "es6" | "es2015" | "es2016" | "es2017" | "es2018" | "es2019" | "es2020" | "es2021"
            | "es2022" | "esnext" => Ok(ScriptTarget::Es2015),
            _ => Err(Error::InvalidOption {
                option: "target",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ScriptTarget {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl Display for ScriptTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptTarget::Es3 => write!(f, "es3"),
            ScriptTarget::Es5 => write!(f, "es5"),
            ScriptTarget::Es2015 => write!(f, "es2015"),
        }
    }
}

/// The compiler options the pipeline understands, as spelled in `compilerOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Output module format.
    pub module: ModuleKind,

    /// Report parameters and properties whose type silently falls back to `any`.
    pub no_implicit_any: bool,

    /// Output language level.
    pub target: ScriptTarget,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            module: ModuleKind::CommonJs,
            no_implicit_any: true,
            target: ScriptTarget::Es5,
        }
    }
}

/// A `tsconfig.json`-style project file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Compiler options, in declaration order.
    #[serde(default)]
    pub compiler_options: Map<String, Value>,

    /// Source files that make up the project.
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(skip)]
    path: PathBuf,
}

const RECOGNIZED_OPTIONS: &[&str] = &["module", "noImplicitAny", "target"];

impl ProjectConfig {
    /// Reads and parses a project file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut project: ProjectConfig = serde_json::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        project.path = path.to_path_buf();
        Ok(project)
    }

    /// Extracts the options the pipeline recognizes, starting from the defaults.
    /// Everything else in `compilerOptions` is ignored.
    pub fn compiler_options(&self) -> Result<CompilerOptions> {
        for key in self.compiler_options.keys() {
            if !RECOGNIZED_OPTIONS.contains(&key.as_str()) {
                debug!(option = key.as_str(), "ignoring compiler option");
            }
        }

        serde_json::from_value(Value::Object(self.compiler_options.clone())).map_err(|source| Error::Config {
            path: self.path.clone(),
            source,
        })
    }

    /// Renders the project as long-form command-line arguments, one entry per line:
    /// `true` options become a bare flag, `false` options are dropped, anything else
    /// is the flag followed by its value. The file list follows the options.
    pub fn to_args(&self) -> Vec<String> {
        let options = self
            .compiler_options
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Bool(false) => None,
                Value::Bool(true) => Some(format!("--{}", key)),
                Value::String(s) => Some(format!("--{} {}", key, s)),
                other => Some(format!("--{} {}", key, other)),
            });

        options.chain(self.files.iter().cloned()).collect()
    }
}
