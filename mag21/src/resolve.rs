//!
//! # Cell Path Resolution
//!
//! Maps `use` statements to the file-system locations of the cells they instantiate,
//! and canonicalizes paths into the keys of the [crate::DesignCache].
//!

// Std-Lib
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve the file of a `use` statement's cell.
///
/// An `explicit` path token with a leading path-root is used verbatim.
/// Anything else, including relative explicit paths, resolves to
/// `<dir>/<cell_type>.<extension>`, next to the declaring file.
pub fn subcell_path(cell_type: &str, dir: &Path, explicit: Option<&str>, extension: &str) -> PathBuf {
    match explicit {
        Some(p) if is_rooted(p) => normalize(Path::new(p)),
        _ => normalize(&dir.join(format!("{}.{}", cell_type, extension))),
    }
}

/// Boolean indication of whether path-string `p` starts from a path root
fn is_rooted(p: &str) -> bool {
    p.starts_with('/') || p.starts_with('\\') || Path::new(p).is_absolute()
}

/// Resolve `path` to an absolute, normalized form.
/// Relative paths are taken relative to `base_dir`,
/// and then to the working directory if `base_dir` is itself relative.
pub fn absolutize(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    let joined = if path.has_root() {
        path.to_path_buf()
    } else {
        base_dir.as_ref().join(path)
    };
    let joined = if joined.has_root() {
        joined
    } else {
        std::env::current_dir()?.join(joined)
    };
    Ok(normalize(&joined))
}

/// Lexically normalize `path`: drop `.` components, and fold `..` into their parents.
/// Does not touch the file system, so symbolic links are not resolved,
/// and paths need not exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut rv = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => continue,
            Component::ParentDir => {
                // Pop a real directory if there is one; `..` at the root stays at the root.
                match rv.components().next_back() {
                    Some(Component::Normal(_)) => {
                        rv.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                    _ => rv.push(".."),
                }
            }
            other => rv.push(other.as_os_str()),
        }
    }
    rv
}
