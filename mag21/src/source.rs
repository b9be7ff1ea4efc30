//!
//! # Cell Sources
//!
//! The parser fetches cell-file content through the [CellSource] trait,
//! generally from the file system via [FsSource].
//! [MemSource] serves content from memory, and counts its reads.
//!

// Std-Lib
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// # Cell Source
///
/// Reads the full content of the cell at (resolved, absolute) path `path`.
/// Reads are blocking and complete; there is no streaming.
pub trait CellSource {
    fn read(&mut self, path: &Path) -> io::Result<String>;
}
impl<T: CellSource + ?Sized> CellSource for &mut T {
    fn read(&mut self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }
}

/// # File-System Source
///
/// Invalid UTF-8, e.g. Latin-1 label text, is replaced with U+FFFD
/// rather than failing the whole cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;
impl CellSource for FsSource {
    fn read(&mut self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// # In-Memory Source
///
/// Maps paths to cell content. Paths should be absolute,
/// as the parser only ever asks for resolved paths.
#[derive(Debug, Default, Clone)]
pub struct MemSource {
    files: HashMap<PathBuf, String>,
    reads: HashMap<PathBuf, usize>,
}
impl MemSource {
    /// Create a new and empty [MemSource]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add (or replace) the content of file `path`. Consumes and returns `self` for chainability.
    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add(path, content);
        self
    }
    /// Add (or replace) the content of file `path`
    pub fn add(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
    /// Number of times `path` has been read, successfully or not
    pub fn reads(&self, path: impl AsRef<Path>) -> usize {
        self.reads.get(path.as_ref()).copied().unwrap_or(0)
    }
    /// Total number of reads across all paths
    pub fn total_reads(&self) -> usize {
        self.reads.values().sum()
    }
}
impl CellSource for MemSource {
    fn read(&mut self, path: &Path) -> io::Result<String> {
        *self.reads.entry(path.to_path_buf()).or_insert(0) += 1;
        match self.files.get(path) {
            Some(content) => Ok(content.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such cell file {:?}", path),
            )),
        }
    }
}
