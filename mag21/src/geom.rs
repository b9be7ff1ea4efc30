//!
//! # Geometry Module
//!
//! Defines the core geometric types [Point], [Rect], and the affine [Transform]
//! carried by each instance, along with their core operations.
//!

// Crates.io
use derive_more::{Add, AddAssign, Sub, SubAssign};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// # Location Integer Type-Alias
///
/// Used for all layout spatial coordinates.
/// Magic stores coordinates in integer "lambda" or internal units.
///
pub type Int = isize;

/// # Point in two-dimensional layout-space
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Serialize,
    Deserialize,
    JsonSchema,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Create a new [Point], transformed from our original location by `trans`.
    /// Coordinate transforms are applied in floating-point format,
    /// and then rounded to the nearest integer.
    pub fn transform(&self, trans: &Transform) -> Point {
        let (x, y) = trans.apply(self.x as f64, self.y as f64);
        Self {
            x: x.round() as Int,
            y: y.round() as Int,
        }
    }
}

/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners,
/// exactly as written in the source file.
/// Corners are *not* normalized: `p0.x` may exceed `p1.x`, and so on.
/// Use [Rect::normalized] for the (min, max) form.
///
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Create a new [Rect] from corner coordinates (x1, y1) and (x2, y2)
    pub fn new(x1: Int, y1: Int, x2: Int, y2: Int) -> Self {
        Self {
            p0: Point::new(x1, y1),
            p1: Point::new(x2, y2),
        }
    }
    /// Create a copy with `p0` at the minimum and `p1` at the maximum of each axis
    pub fn normalized(&self) -> Self {
        let (p0, p1) = (&self.p0, &self.p1);
        Self::new(
            p0.x.min(p1.x),
            p0.y.min(p1.y),
            p0.x.max(p1.x),
            p0.y.max(p1.y),
        )
    }
    /// Calculate our center-point, rounded toward zero.
    /// Computed in 128 bits, so that corners anywhere in the [Int] range cannot overflow.
    pub fn center(&self) -> Point {
        let mid = |a: Int, b: Int| ((a as i128 + b as i128) / 2) as Int;
        Point::new(mid(self.p0.x, self.p1.x), mid(self.p0.y, self.p1.y))
    }
}

/// # Text Label
///
/// Parsed from `rlabel` lines. The label's `layer` is free-form,
/// and need not match the name of the `<< layer >>` block enclosing it.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Label {
    /// Layer the label attaches to
    pub layer: String,
    /// Anchoring area
    pub rect: Rect,
    /// Magic text position/ rotation code
    pub rotation: Int,
    /// Label text. May contain spaces.
    pub text: String,
}

///
/// # Affine Transform
///
/// 2x2 matrix and two-entry translation vector,
/// mapping points in an instance's coordinate-space into its parent's.
///
/// Magic writes these as six coefficients `A B C D E F`, such that:
///
/// ```text
/// x' = A*x + B*y + C
/// y' = D*x + E*y + F
/// ```
///
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Transform {
    /// Transformation Matrix, in row-major order
    pub a: [[f64; 2]; 2],
    /// X-Y Translation
    pub b: [f64; 2],
}
impl Default for Transform {
    /// Default transforms are the identity
    fn default() -> Self {
        Self::identity()
    }
}
impl Transform {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }
    /// Translation by (x,y)
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x, y],
        }
    }
    /// Create from the six `transform`-line coefficients `[A, B, C, D, E, F]`
    pub fn from_coefficients(c: [f64; 6]) -> Self {
        Self {
            a: [[c[0], c[1]], [c[3], c[4]]],
            b: [c[2], c[5]],
        }
    }
    /// Get our six `transform`-line coefficients `[A, B, C, D, E, F]`
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.a[0][0],
            self.a[0][1],
            self.b[0],
            self.a[1][0],
            self.a[1][1],
            self.b[1],
        ]
    }
    /// Boolean indication of whether we are the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
    /// Apply to floating-point coordinates (x, y)
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a[0][0] * x + self.a[0][1] * y + self.b[0],
            self.a[1][0] * x + self.a[1][1] * y + self.b[1],
        )
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    /// Applying the result equals applying `child`, then `parent`.
    ///
    /// Note this operation *is not* commutative.
    /// For example the set of transformations:
    /// * (a) Reflect vertically, then
    /// * (b) Translate by (1,1)
    /// * (c) Place a point at (local coordinate) (1,1)
    /// Lands said point at (2,-2) in top-level space,
    /// whereas reversing the order of (a) and (b) lands it at (2,0).
    ///
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        // The result-transform's origin is the parent's origin,
        // plus the parent-transformed child's origin
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        // And the cascade-matrix is the product of the parent's and child's
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }
}
/// Multiply 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}
/// Multiply a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector
fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}

pub trait TransformTrait {
    /// Apply matrix-vector [Transform] `trans`.
    /// Creates a new object at a location equal to the transformation of our own.
    fn transform(&self, trans: &Transform) -> Self;
}
impl TransformTrait for Point {
    fn transform(&self, trans: &Transform) -> Self {
        Point::transform(self, trans)
    }
}
impl TransformTrait for Rect {
    /// Transforms both corners. Note the result is not normalized;
    /// rotations and reflections commonly swap corner order.
    fn transform(&self, trans: &Transform) -> Self {
        Rect {
            p0: self.p0.transform(trans),
            p1: self.p1.transform(trans),
        }
    }
}
impl TransformTrait for Label {
    fn transform(&self, trans: &Transform) -> Self {
        Label {
            rect: self.rect.transform(trans),
            ..self.clone()
        }
    }
}
