//!
//! # Parse Options
//!

// Crates.io
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default bound on cell-hierarchy depth
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// # Parse Options
///
/// Tunables for a [crate::CellParser] run.
/// Serializable, so they can be kept alongside a project in any [crate::SerializationFormat],
/// e.g. as TOML:
///
/// ```toml
/// max_depth = 32
/// extension = "mag"
/// ```
///
/// Fields missing from a file take their default values.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
#[builder(pattern = "owned", setter(into), default)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum nesting depth of instances below the top-level cell
    pub max_depth: usize,
    /// File extension of cells referenced without an explicit path
    pub extension: String,
}
impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extension: String::from("mag"),
        }
    }
}
impl ParseOptions {
    /// Create a new [ParseOptionsBuilder]
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

// Implement the serialization to/from file trait for options
impl crate::ser::SerdeFile for ParseOptions {}
