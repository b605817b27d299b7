//! Path utilities for the destination guard.
//!
//! These helpers work on path components, never on raw strings, so
//! `/data/src2` is not considered to be inside `/data/src`.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory without touching the
/// filesystem beyond reading the current directory.
pub(crate) fn absolute(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Remove `.` components and fold `..` into the preceding component.
///
/// Purely lexical: if a folded component is a symlink the result can name a
/// different entry than `path` does.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Resolve symlinks in the longest existing ancestor of `path`, then re-append
/// the part that does not exist yet.
///
/// Falls back to `path` unchanged when no ancestor can be canonicalized.
pub(crate) fn resolve_existing_prefix(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        if let Ok(canonical) = fs::canonicalize(ancestor) {
            return match path.strip_prefix(ancestor) {
                Ok(rest) if rest.as_os_str().is_empty() => canonical,
                Ok(rest) => normalize_lexically(&canonical.join(rest)),
                Err(_) => canonical,
            };
        }
    }
    path.to_path_buf()
}

/// Whether `path` is `base` or lies below it, comparing whole components.
pub(crate) fn is_within(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}
