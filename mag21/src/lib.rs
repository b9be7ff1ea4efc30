//!
//! # Mag21 Magic Cell-Hierarchy Reader
//!
//! Reads the text-based cell format of the Magic VLSI layout editor.
//! Starting from a top-level `.mag` file, each instantiated sub-cell is located,
//! parsed and memoized, producing a hierarchy of shared [Design]s.
//!
//! Primary entry-points are [parse_file] and, for control over caching, file access,
//! diagnostics and [ParseOptions], the [CellParser].
//! Parsed hierarchies can be flattened into top-level coordinates with [Design::flatten],
//! or exported as a dependency-ordered [MagLibrary] to JSON, YAML or TOML.
//!

pub mod error;
pub use error::*;

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod geom;
pub use geom::*;

pub mod bbox;
pub use bbox::*;

pub mod data;
pub use data::*;

pub mod diag;
pub use diag::*;

pub mod source;
pub use source::*;

pub mod options;
pub use options::*;

pub mod cache;
pub use cache::*;

pub mod resolve;

pub mod read;

pub mod parser;
pub use parser::*;

pub mod flatten;
pub use flatten::*;

pub mod library;
pub use library::*;

#[cfg(test)]
mod tests;
