//!
//! # Mag21 Result and Error Types
//!

// Std-Lib
use std::path::PathBuf;
use std::sync::Arc;

// Crates.io
use thiserror::Error;

/// # [MagError] Result Type
pub type MagResult<T> = Result<T, MagError>;

///
/// # Mag21 Error Enumeration
///
/// Only failures which abort an entire parse, or an export, arrive here.
/// Per-line problems (malformed fields, missing sub-cells) are reported as
/// [crate::Diagnostic]s instead, and parsing carries on.
///
#[derive(Debug, Error)]
pub enum MagError {
    /// The top-level cell file could not be read
    #[error("cannot read cell file {path:?}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    /// A cell (transitively) instantiates itself.
    /// `stack` holds the chain of cells being resolved, outermost first.
    #[error("cyclic cell reference: {path:?} is already being resolved")]
    CyclicReference { path: PathBuf, stack: Vec<PathBuf> },
    /// Cell hierarchy nested deeper than the configured limit
    #[error("cell hierarchy exceeds {max_depth} levels at {path:?}")]
    DepthExceeded { path: PathBuf, max_depth: usize },
    /// File IO, other than reading cells
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    /// Uncategorized Error, with String Message
    #[error("{0}")]
    Str(String),
}
impl MagError {
    /// Create a [MagError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [MagError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
}
impl From<String> for MagError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for MagError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
