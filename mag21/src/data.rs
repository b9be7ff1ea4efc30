//!
//! # Mag21 Data Model
//!
//! Defines the parsed representation of Magic cells:
//! [Design], its [Header], per-layer [LayerGeometry], and placed [Instance]s of other cells.
//!

// Std-Lib
use std::path::{Path, PathBuf};

// Crates.io
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::geom::{Label, Rect, Transform};
use crate::ptr::Ptr;

/// # Cell Header
///
/// Metadata from the `magic`, `tech` and `timestamp` lines.
/// All fields are optional; repeated lines overwrite earlier values.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Header {
    /// File type. Always `magic` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Format version, e.g. `4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_version: Option<String>,
    /// Remainder of the `magic` line, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    /// Technology name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech: Option<String>,
    /// Modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// # Per-Layer Geometry
///
/// Rectangles and labels declared within one `<< layer >>` block,
/// or several same-named blocks, in file order.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LayerGeometry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rects: Vec<Rect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}
impl LayerGeometry {
    /// Boolean indication of having neither rectangles nor labels
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.labels.is_empty()
    }
}

/// # Instance of another Cell
///
/// One `use` statement, together with the placement lines following it.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Instance {
    /// Name of the instantiated cell
    pub cell_type: String,
    /// Instance Name. Unique by convention only.
    pub instance_name: String,
    /// Resolved path of the instantiated cell's file
    pub file_path: PathBuf,
    /// Placement into the parent's coordinate space
    #[serde(default)]
    pub transform: Transform,
    /// Bounding box, from the `box` line
    #[serde(default)]
    pub bbox: Rect,
    /// Timestamp, if one appeared while this instance was open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Instantiated cell, shared through the [crate::DesignCache].
    /// Always populated by the parser; absent after deserialization,
    /// where `file_path` serves as the reference.
    #[serde(skip)]
    #[schemars(skip)]
    pub design: Option<Ptr<Design>>,
}
impl Instance {
    /// Create a new [Instance] with identity placement and a zero box
    pub fn new(
        cell_type: impl Into<String>,
        instance_name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        design: Ptr<Design>,
    ) -> Self {
        Self {
            cell_type: cell_type.into(),
            instance_name: instance_name.into(),
            file_path: file_path.into(),
            design: Some(design),
            ..Default::default()
        }
    }
}

/// # Design
///
/// The parsed content of one Magic cell file.
/// Immutable once returned by the parser, and shared by every [Instance] of it.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Design {
    /// Cell Name. The file stem of `path`.
    pub name: String,
    /// Resolved path of the source file
    pub path: PathBuf,
    /// Header Metadata
    #[serde(default)]
    pub header: Header,
    /// Geometry by layer name, in order of first appearance
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub layers: IndexMap<String, LayerGeometry>,
    /// Instances, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<Instance>,
}
impl Design {
    /// Create a new and empty [Design], named after the file stem of `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: cell_name(&path),
            path,
            ..Default::default()
        }
    }
    /// Get the geometry of layer `name`, if declared
    pub fn layer(&self, name: &str) -> Option<&LayerGeometry> {
        self.layers.get(name)
    }
    /// Get the geometry of layer `name`, declaring it if necessary
    pub fn layer_mut(&mut self, name: &str) -> &mut LayerGeometry {
        self.layers.entry(name.to_string()).or_default()
    }
    /// Get a reference to the first [Instance] named `name`
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.instance_name == name)
    }
    /// Create a [BoundBox] around our own rectangles and labels.
    /// Instances are not included; see [crate::FlatLayout::bbox] for the hierarchical version.
    pub fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for geom in self.layers.values() {
            bbox = geom.rects.bbox().union(&bbox);
            bbox = geom.labels.bbox().union(&bbox);
        }
        bbox
    }
}

/// Derive a cell name from its file path, as Magic does: the file stem.
pub(crate) fn cell_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Implement the serialization to/from file trait for designs
impl crate::ser::SerdeFile for Design {}
