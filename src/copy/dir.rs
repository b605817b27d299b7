//! Directory copy operations.
//!
//! A directory task opens the source stream, makes sure the destination
//! directory exists, then pulls entries one at a time and dispatches a child
//! task for every file and subdirectory. The stream stays open until the
//! last batch of children has been joined.

use crate::error::{Error, FsOp, Result};
use crate::task::{CopyTask, EntryMetadata, check_path_len};
use std::fs::{self, ReadDir};

use super::Engine;
use super::utils::{create_dir, set_dir_mode};

/// Replicate one directory and everything below it.
///
/// The destination is created with mode `0755` before any child runs; an
/// existing directory is reused as is. Child failures are reported by the
/// children themselves and never surface here.
pub(crate) fn replicate_dir(engine: &Engine<'_>, task: &CopyTask) -> Result<()> {
    let src = task.src();
    let dst = task.dst();

    let entries = engine.retry(FsOp::OpenDir, src, || fs::read_dir(src))?;

    let created = engine.retry(FsOp::CreateDir, dst, || create_dir(dst))?;
    if created {
        if let Err(e) = set_dir_mode(dst) {
            engine.fail(&Error::io(FsOp::SetPermissions, dst, e));
        }
    }
    engine.dir_ready(task, created);

    let children = ChildTasks {
        engine,
        parent: task,
        entries,
        done: false,
    };
    let dispatched = engine.dispatch(children);

    tracing::debug!(src = %src.display(), dispatched, "directory done");
    Ok(())
}

/// Streams the child tasks of one directory.
///
/// Entries that cannot become a task (unsupported type, path too long,
/// failed `lstat`) are reported and passed over. A failure reading the
/// stream itself ends the enumeration.
struct ChildTasks<'e, 'a> {
    engine: &'e Engine<'a>,
    parent: &'e CopyTask,
    entries: ReadDir,
    done: bool,
}

impl Iterator for ChildTasks<'_, '_> {
    type Item = CopyTask;

    fn next(&mut self) -> Option<CopyTask> {
        if self.done {
            return None;
        }
        let max_len = self.engine.options().max_path_len;

        loop {
            // `read_dir` never yields `.` or `..`
            let entry = match self.entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.engine
                        .fail(&Error::io(FsOp::ReadDirEntry, self.parent.src(), e));
                    self.done = true;
                    return None;
                }
                None => {
                    self.done = true;
                    return None;
                }
            };

            let name = entry.file_name();
            let src = self.parent.src().join(&name);
            let dst = self.parent.dst().join(&name);
            let checked =
                check_path_len(&src, max_len).and_then(|()| check_path_len(&dst, max_len));
            if let Err(e) = checked {
                self.engine.fail(&e);
                continue;
            }

            let meta = match self
                .engine
                .retry(FsOp::Inspect, &src, || fs::symlink_metadata(&src))
            {
                Ok(meta) => EntryMetadata::from(&meta),
                Err(e) => {
                    self.engine.fail(&e);
                    continue;
                }
            };

            let Some(kind) = meta.kind.task_kind() else {
                self.engine.skip(&src, meta.kind);
                continue;
            };

            return Some(CopyTask::from_checked(src, dst, kind));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
