//! Diagnostics sinks for per-task outcomes.
//!
//! Tasks never propagate errors to their parent or siblings. Instead every
//! failure, skipped entry and completed task is handed to a [`Reporter`]
//! passed into the copy engine. The default, [`TracingReporter`], turns
//! failures into `error!` and skips into `warn!` events.

use crate::error::Error;
use crate::task::{CopyTask, EntryKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Receives the outcome of individual tasks.
///
/// Called concurrently from worker threads.
pub trait Reporter: Send + Sync {
    /// A filesystem operation on `path` failed and its task was abandoned.
    fn failed(&self, path: &Path, error: &Error);

    /// An entry of an unsupported kind was left out of the copy.
    fn skipped(&self, path: &Path, kind: EntryKind);

    /// A file task finished after writing `bytes` bytes.
    fn file_copied(&self, _task: &CopyTask, _bytes: u64) {}

    /// A directory task's destination directory exists and its children are
    /// about to be dispatched. `created` is false when it already existed.
    fn dir_ready(&self, _task: &CopyTask, _created: bool) {}
}

/// Logs failures and skips through `tracing`.
///
/// Failures are logged at `error`, skips at `warn`. Every [`Error`] message
/// already names its path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn failed(&self, _path: &Path, error: &Error) {
        tracing::error!("{}", error);
    }

    fn skipped(&self, path: &Path, kind: EntryKind) {
        tracing::warn!("ignoring {}: {}", kind, path.display());
    }

    fn file_copied(&self, task: &CopyTask, bytes: u64) {
        tracing::trace!(
            src = %task.src().display(),
            dst = %task.dst().display(),
            bytes,
            "file copied"
        );
    }

    fn dir_ready(&self, task: &CopyTask, created: bool) {
        tracing::trace!(dst = %task.dst().display(), created, "directory ready");
    }
}

/// One event recorded by [`CollectingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A task failed; the error is kept in its display form
    Failed {
        /// Offending path
        path: PathBuf,
        /// Rendered error
        message: String,
    },
    /// An unsupported entry was skipped
    Skipped {
        /// Skipped path
        path: PathBuf,
        /// Its kind
        kind: EntryKind,
    },
    /// A file was copied
    FileCopied {
        /// Destination path
        dst: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// A directory was prepared
    DirReady {
        /// Destination path
        dst: PathBuf,
        /// Whether it was newly created
        created: bool,
    },
}

/// Records every event in memory.
///
/// Useful for embedding the engine where failures must be inspected after the
/// run rather than read back from a log.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use treecopy::{CollectingReporter, CopyOptions, copy_tree_with_reporter};
///
/// let reporter = CollectingReporter::new();
/// let options = CopyOptions::default();
/// copy_tree_with_reporter(Path::new("src"), Path::new("dst"), &options, &reporter)?;
/// for (path, message) in reporter.failures() {
///     eprintln!("{}: {}", path.display(), message);
/// }
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ReportEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// All events in the order they were reported
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Failed paths with their rendered errors
    pub fn failures(&self) -> Vec<(PathBuf, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Failed { path, message } => Some((path, message)),
                _ => None,
            })
            .collect()
    }

    /// Skipped paths with their kinds
    pub fn skipped_entries(&self) -> Vec<(PathBuf, EntryKind)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Skipped { path, kind } => Some((path, kind)),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn failed(&self, path: &Path, error: &Error) {
        self.push(ReportEvent::Failed {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }

    fn skipped(&self, path: &Path, kind: EntryKind) {
        self.push(ReportEvent::Skipped {
            path: path.to_path_buf(),
            kind,
        });
    }

    fn file_copied(&self, task: &CopyTask, bytes: u64) {
        self.push(ReportEvent::FileCopied {
            dst: task.dst().to_path_buf(),
            bytes,
        });
    }

    fn dir_ready(&self, task: &CopyTask, created: bool) {
        self.push(ReportEvent::DirReady {
            dst: task.dst().to_path_buf(),
            created,
        });
    }
}
