//!
//! # Rectangular Bounding Boxes and Associated Trait
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::geom::{Int, Label, Point, Rect};

/// # Rectangular Bounding Box
///
/// Points `p0` and `p1` represent opposite corners of a bounding rectangle.
/// `p0` is always closest to negative-infinity, in both x and y,
/// and `p1` is always closest to positive-infinity.
///
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct BoundBox {
    pub p0: Point,
    pub p1: Point,
}
impl BoundBox {
    /// Create a new [BoundBox] from two [Point]s.
    /// Callers are responsible for ensuring that p0.x <= p1.x, and p0.y <= p1.y.
    fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a new [BoundBox] from a single [Point].
    /// The resultant [BoundBox] comprises solely the point, having zero area.
    pub fn from_point(pt: Point) -> Self {
        Self { p0: pt, p1: pt }
    }
    /// Create a new [BoundBox] from two points, in any order
    pub fn from_points(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create an empty, otherwise invalid [BoundBox]
    pub fn empty() -> Self {
        Self {
            p0: Point::new(Int::MAX, Int::MAX),
            p1: Point::new(Int::MIN, Int::MIN),
        }
    }
    /// Boolean indication of whether a box is empty
    pub fn is_empty(&self) -> bool {
        self.p0.x > self.p1.x || self.p0.y > self.p1.y
    }
    /// Expand an existing [BoundBox] in all directions by `delta`,
    /// saturating at the limits of [Int]. Empty boxes stay empty.
    pub fn expand(&mut self, delta: Int) {
        if self.is_empty() {
            return;
        }
        self.p0.x = self.p0.x.saturating_sub(delta);
        self.p0.y = self.p0.y.saturating_sub(delta);
        self.p1.x = self.p1.x.saturating_add(delta);
        self.p1.y = self.p1.y.saturating_add(delta);
    }
    /// Get the box's size as an (x,y) tuple. Empty boxes have size zero.
    pub fn size(&self) -> (usize, usize) {
        if self.is_empty() {
            return (0, 0);
        }
        (self.p1.x.abs_diff(self.p0.x), self.p1.y.abs_diff(self.p0.y))
    }
}
impl From<Rect> for BoundBox {
    fn from(r: Rect) -> Self {
        Self::from_points(r.p0, r.p1)
    }
}

///
/// # Bounding Box Trait
///
/// Methods for interacting with [BoundBox]s.
/// Implementations for [Point]s, [Rect]s, [Label]s and [BoundBox]s
/// enable unions across them.
///
pub trait BoundBoxTrait {
    /// Compute the union with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        let me = self.bbox();
        BoundBox::new(
            Point::new(me.p0.x.min(bbox.p0.x), me.p0.y.min(bbox.p0.y)),
            Point::new(me.p1.x.max(bbox.p1.x), me.p1.y.max(bbox.p1.y)),
        )
    }
    /// Compute a rectangular bounding box around the implementing type.
    fn bbox(&self) -> BoundBox;
}
impl BoundBoxTrait for BoundBox {
    fn bbox(&self) -> BoundBox {
        *self
    }
}
impl BoundBoxTrait for Point {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_point(*self)
    }
}
impl BoundBoxTrait for Rect {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_points(self.p0, self.p1)
    }
}
impl BoundBoxTrait for Label {
    fn bbox(&self) -> BoundBox {
        self.rect.bbox()
    }
}
impl<T: BoundBoxTrait> BoundBoxTrait for [T] {
    /// Union over all elements. Empty slices produce [BoundBox::empty].
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for elem in self.iter() {
            bbox = elem.union(&bbox);
        }
        bbox
    }
}
