//!
//! # Cell Library Export
//!
//! Collects every [Design] reachable from a top-level cell into a flat,
//! dependency-ordered and serializable [MagLibrary].
//!

// Std-Lib
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::data::Design;
use crate::error::{MagError, MagResult};
use crate::ptr::Ptr;

/// # Library Cell
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LibraryCell {
    /// Source path, relative to the top-level cell's directory
    pub path: PathBuf,
    /// Cell content. Its `path` and instance `file_path`s are relative as well.
    pub design: Design,
}

///
/// # Magic Cell Library
///
/// Every distinct [Design] in a hierarchy, each exactly once,
/// ordered such that cells appear after all the cells they instantiate.
/// The top-level cell is therefore always last.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MagLibrary {
    /// Top-level cell name
    pub top: String,
    /// Cells, in dependency order
    pub cells: Vec<LibraryCell>,
}
impl MagLibrary {
    /// Collect the hierarchy rooted at `top`
    pub fn from_design(top: &Ptr<Design>) -> MagResult<Self> {
        let base = top.path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let cells = DepOrderer::order(top)?
            .iter()
            .map(|design| {
                let mut design = Design::clone(design);
                design.path = relative_to(&design.path, &base);
                for inst in design.instances.iter_mut() {
                    inst.file_path = relative_to(&inst.file_path, &base);
                    inst.design = None;
                }
                LibraryCell {
                    path: design.path.clone(),
                    design,
                }
            })
            .collect();
        Ok(Self {
            top: top.name.clone(),
            cells,
        })
    }
    /// Get the first cell named `name`
    pub fn cell(&self, name: &str) -> Option<&LibraryCell> {
        self.cells.iter().find(|c| c.design.name == name)
    }
    /// Get the names of all cells, in dependency order
    pub fn cell_names(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.design.name.as_str()).collect()
    }
}
// Implement the serialization to/from file trait for libraries
impl crate::ser::SerdeFile for MagLibrary {}

/// # Dependency Orderer
///
/// Depth-first walk of the instance graph, pushing each [Design] after its dependencies.
struct DepOrderer {
    /// Ordered, completed items
    stack: Vec<Ptr<Design>>,
    /// Hash-set of completed items, for quick membership tests
    seen: HashSet<Ptr<Design>>,
    /// Open recursive stack-frames, for cycle detection
    pending: Vec<Ptr<Design>>,
}
impl DepOrderer {
    /// Dependency-order the hierarchy rooted at `top`
    fn order(top: &Ptr<Design>) -> MagResult<Vec<Ptr<Design>>> {
        let mut this = Self {
            stack: Vec::new(),
            seen: HashSet::new(),
            pending: Vec::new(),
        };
        this.push(top)?;
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    fn push(&mut self, item: &Ptr<Design>) -> MagResult<()> {
        if self.seen.contains(item) {
            return Ok(());
        }
        if self.pending.contains(item) {
            return Err(MagError::CyclicReference {
                path: item.path.clone(),
                stack: self.pending.iter().map(|d| d.path.clone()).collect(),
            });
        }
        self.pending.push(item.clone());
        for inst in &item.instances {
            if let Some(dep) = &inst.design {
                self.push(dep)?;
            }
        }
        self.pending.pop();
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

/// Express `path` relative to directory `base`, lexically.
/// Paths with a different root or prefix than `base` are returned unchanged.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let mut pcomps = path.components().peekable();
    let mut bcomps = base.components().peekable();
    // Strip the common prefix
    while let (Some(p), Some(b)) = (pcomps.peek(), bcomps.peek()) {
        if p != b {
            break;
        }
        pcomps.next();
        bcomps.next();
    }
    let mut rv = PathBuf::new();
    for b in bcomps {
        match b {
            Component::Normal(_) => rv.push(".."),
            Component::CurDir => (),
            // Different roots, or a `..` we cannot undo
            _ => return path.to_path_buf(),
        }
    }
    for p in pcomps {
        rv.push(p.as_os_str());
    }
    rv
}
