//!
//! # Hierarchy Flattening
//!
//! Maps every rectangle, label and instance of a [Design] hierarchy
//! into top-level coordinates.
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};
use crate::data::Design;
use crate::geom::{Int, Label, Point, Rect, Transform, TransformTrait};

/// # Transform Composition Mode
///
/// How an instance's transform combines with those of its ancestors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Composition {
    /// Cascade each instance's transform with all of its ancestors'.
    /// Grandchild geometry lands where Magic draws it.
    Chained,
    /// Apply only each instance's own transform, ignoring its ancestors'.
    /// Reproduces legacy single-level renderers.
    SingleLevel,
}
impl Default for Composition {
    fn default() -> Self {
        Self::Chained
    }
}

/// Flattened rectangle, normalized, in top-level coordinates
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlatRect {
    pub layer: String,
    pub rect: Rect,
}
/// Flattened label, in top-level coordinates
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlatLabel {
    /// Name of the layer-block declaring the label
    pub layer: String,
    pub label: Label,
    /// Text anchor, at the center of the label's area
    pub anchor: Point,
}
/// Flattened instance outline
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlatInstance {
    /// Instance names from the top-level cell down to this instance
    pub path: Vec<String>,
    /// Instantiated cell name
    pub cell_type: String,
    /// Instance box, normalized, in top-level coordinates
    pub bbox: Rect,
}

/// # Flattened Layout
///
/// All geometry of a cell hierarchy, in depth-first declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FlatLayout {
    pub rects: Vec<FlatRect>,
    pub labels: Vec<FlatLabel>,
    pub instances: Vec<FlatInstance>,
}
impl FlatLayout {
    /// Create a rectangular [BoundBox] surrounding all flattened rectangles and labels
    pub fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for r in &self.rects {
            bbox = r.rect.union(&bbox);
        }
        for l in &self.labels {
            bbox = l.label.union(&bbox);
        }
        bbox
    }
    /// Plot bounds: our [BoundBox], expanded by `padding` on every side
    pub fn plot_bounds(&self, padding: Int) -> BoundBox {
        let mut bbox = self.bbox();
        bbox.expand(padding);
        bbox
    }
}
/// Default padding of [FlatLayout::plot_bounds], in layout units
pub const PLOT_PADDING: Int = 20;

// Implement the serialization to/from file trait for flattened layouts
impl crate::ser::SerdeFile for FlatLayout {}

impl Design {
    /// Flatten a [Design], particularly its hierarchical instances, into a [FlatLayout].
    ///
    /// Instances without a loaded [Design], e.g. those of a deserialized [Design], are skipped.
    pub fn flatten(&self, mode: Composition) -> FlatLayout {
        // Kick off recursive calls, with the identity-transform applied for the top-level design
        let mut flat = FlatLayout::default();
        let mut path = Vec::new();
        flatten_helper(self, &Transform::identity(), mode, &mut path, &mut flat);
        flat
    }
}
/// Internal helper and core logic for [Design::flatten].
fn flatten_helper(
    design: &Design,
    trans: &Transform,
    mode: Composition,
    path: &mut Vec<String>,
    flat: &mut FlatLayout,
) {
    for (layer, geom) in &design.layers {
        for rect in &geom.rects {
            flat.rects.push(FlatRect {
                layer: layer.clone(),
                rect: rect.transform(trans).normalized(),
            });
        }
        for label in &geom.labels {
            let label = label.transform(trans);
            flat.labels.push(FlatLabel {
                layer: layer.clone(),
                anchor: label.rect.center(),
                label,
            });
        }
    }
    for inst in &design.instances {
        let cell = match &inst.design {
            Some(cell) => cell,
            None => continue,
        };
        let inst_trans = match mode {
            Composition::Chained => Transform::cascade(trans, &inst.transform),
            Composition::SingleLevel => inst.transform,
        };
        path.push(inst.instance_name.clone());
        flat.instances.push(FlatInstance {
            path: path.clone(),
            cell_type: inst.cell_type.clone(),
            bbox: inst.bbox.transform(&inst_trans).normalized(),
        });
        flatten_helper(cell, &inst_trans, mode, path, flat);
        path.pop();
    }
}
