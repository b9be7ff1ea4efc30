//!
//! # Shared-Pointer Types
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Shared, immutable, reference-counted pointer to a parsed cell.
///
/// A [crate::Design] is never modified once the parser hands it back,
/// so unlike a read-write lock, access is a plain [Deref]:
///
/// ```text
/// let design: Ptr<Design> = parser.parse("top.mag", ".")?;
/// for inst in design.instances.iter() { ... }
/// ```
///
/// [Ptr] uses the [ByAddress] struct for comparisons and hashes *by address*.
/// Every instance of the same sub-cell shares one [Ptr] through the [crate::DesignCache],
/// so two instances refer to "the same cell" exactly when their pointers compare equal.
/// Pointers also serve as hash-keys when walking the (heavily shared) hierarchy,
/// e.g. during dependency-ordering.
///
#[derive(Debug)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<T>>);

impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(t: T) -> Self {
        Self(ByAddress(Arc::new(t)))
    }
}
impl<T: ?Sized> Ptr<T> {
    /// Boolean indication of whether `a` and `b` point to the same allocation.
    /// Equivalent to `a == b`.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&(a.0).0, &(b.0).0)
    }
    /// Number of live pointers to our target
    pub fn count(this: &Self) -> usize {
        Arc::strong_count(&(this.0).0)
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
impl<T: ?Sized> Deref for Ptr<T> {
    type Target = T;
    fn deref(&self) -> &T {
        (self.0).0.as_ref()
    }
}
// Having a [Deref] implementation seems to screw with the auto-`derive`d implementations
// of a few key traits. Conveniently, they're all quite short.
impl<T: ?Sized> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress(Arc::clone(&(self.0).0)))
    }
}
impl<T: ?Sized> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T: ?Sized> Eq for Ptr<T> {}
impl<T: ?Sized> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}
