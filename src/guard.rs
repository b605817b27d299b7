//! Root validation: turns the user's source and destination into the single
//! root [`CopyTask`].

use crate::error::{Error, FsOp, Result};
use crate::task::{CopyTask, EntryKind};
use crate::utils::path::{absolute, is_within, normalize_lexically, resolve_existing_prefix};
use std::fs;
use std::path::Path;

/// Validate `src` and `dst` and build the root task.
///
/// The source is canonicalized. The destination keeps the spelling it was
/// given (made absolute) but is checked against the canonical source twice:
/// once lexically and once with symlinks in its existing ancestors resolved.
pub(crate) fn root_task(src: &Path, dst: &Path, max_path_len: usize) -> Result<CopyTask> {
    let source_root = fs::canonicalize(src).map_err(|e| Error::SourceResolve {
        path: src.to_path_buf(),
        source: e,
    })?;

    let destination = absolute(dst).map_err(|e| Error::io(FsOp::ResolveDestination, dst, e))?;
    check_outside(&source_root, &destination)?;

    let meta = fs::symlink_metadata(&source_root).map_err(|e| Error::SourceMetadata {
        path: source_root.clone(),
        source: e,
    })?;
    let kind = EntryKind::from_file_type(meta.file_type());
    let Some(task_kind) = kind.task_kind() else {
        return Err(Error::UnsupportedRoot {
            path: source_root,
            kind,
        });
    };

    CopyTask::new(source_root, destination, task_kind, max_path_len)
}

/// Reject a destination that is the source root or lies inside it.
fn check_outside(source_root: &Path, destination: &Path) -> Result<()> {
    let lexical = normalize_lexically(destination);
    let resolved = resolve_existing_prefix(destination);

    if is_within(&lexical, source_root) || is_within(&resolved, source_root) {
        return Err(Error::DestinationInsideSource {
            source_root: source_root.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}
