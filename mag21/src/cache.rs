//!
//! # Design Cache
//!
//! Memoizes parsed cells by resolved path, for the duration of one or more parses.
//!

// Std-Lib
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Local Imports
use crate::data::Design;
use crate::ptr::Ptr;

/// Cached outcome of loading one cell file
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Successfully parsed
    Parsed(Ptr<Design>),
    /// Unreadable. Cached so that a missing cell referenced many times is only tried once.
    Missing(Arc<std::io::Error>),
}
impl CacheEntry {
    /// Get the parsed [Design], if any
    pub fn design(&self) -> Option<&Ptr<Design>> {
        match self {
            Self::Parsed(d) => Some(d),
            Self::Missing(_) => None,
        }
    }
}

/// # Design Cache
///
/// Maps resolved absolute paths to [CacheEntry]s, guaranteeing each distinct path
/// is read and parsed at most once. Every [crate::Instance] of a cell shares the same cached [Ptr].
///
/// Callers create a cache and lend it (`&mut`) to a [crate::CellParser].
/// Independent parses use independent caches; reusing one across several top-level
/// parses shares their common sub-cells.
#[derive(Debug, Default)]
pub struct DesignCache {
    entries: HashMap<PathBuf, CacheEntry>,
    hits: usize,
    misses: usize,
}
impl DesignCache {
    /// Create a new and empty [DesignCache]
    pub fn new() -> Self {
        Self::default()
    }
    /// Look up `path`, counting a hit or miss
    pub(crate) fn lookup(&mut self, path: &Path) -> Option<CacheEntry> {
        let entry = self.entries.get(path).cloned();
        match entry {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        entry
    }
    /// Get the entry for `path`, without counting a hit
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&CacheEntry> {
        self.entries.get(path.as_ref())
    }
    /// Get the parsed [Design] for `path`, if any
    pub fn design(&self, path: impl AsRef<Path>) -> Option<&Ptr<Design>> {
        self.get(path)?.design()
    }
    /// Boolean indication of whether `path` has an entry, parsed or missing
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }
    /// Insert the entry for `path`
    pub(crate) fn insert(&mut self, path: PathBuf, entry: CacheEntry) {
        self.entries.insert(path, entry);
    }
    /// Number of entries, parsed or missing
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Boolean indication of having no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Number of lookups served from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }
    /// Number of lookups not found in the cache, i.e. that led to a read
    pub fn misses(&self) -> usize {
        self.misses
    }
    /// Iterate over all parsed [Design]s, in no particular order
    pub fn designs(&self) -> impl Iterator<Item = (&PathBuf, &Ptr<Design>)> {
        self.entries
            .iter()
            .filter_map(|(path, entry)| entry.design().map(|d| (path, d)))
    }
    /// Iterate over the paths of all unreadable cells, in no particular order
    pub fn missing(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, CacheEntry::Missing(_)))
            .map(|(path, _)| path)
    }
    /// Remove all entries and statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
