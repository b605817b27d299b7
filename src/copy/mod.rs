//! Core copy operations.
//!
//! [`copy_tree`] validates the root, then runs the root [`CopyTask`] on a
//! worker pool. Directory tasks create their destination, enumerate the
//! source and hand every child to a [`Batcher`](batch::Batcher); file tasks
//! stream bytes. Each task owns its paths and handles, and its failure is
//! reported, never propagated.

mod batch;
mod dir;
mod file;
mod utils;

pub use file::COPY_BUFFER_SIZE;

use crate::error::{Error, FsOp, Result};
use crate::guard;
use crate::options::CopyOptions;
use crate::reporter::{Reporter, TracingReporter};
use crate::task::{CopyTask, EntryKind, TaskKind};
use batch::Batcher;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Statistics from a copy operation.
///
/// Returned by [`copy_tree`] to provide information about what was copied.
///
/// # Example
///
/// ```no_run
/// use treecopy::{copy_tree, CopyOptions};
/// use std::path::Path;
///
/// let stats = copy_tree(Path::new("src"), Path::new("dst"), &CopyOptions::default())?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// if !stats.is_complete() {
///     eprintln!("{} entries failed", stats.failures);
/// }
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyStats {
    /// Number of files fully copied
    pub files_copied: u64,
    /// Total bytes written to destination files
    pub bytes_copied: u64,
    /// Number of destination directories created (reused ones excluded)
    pub dirs_created: u64,
    /// Number of entries skipped because of their type
    pub entries_skipped: u64,
    /// Number of failed tasks and entries
    pub failures: u64,
    /// Number of transient-error retries performed
    pub retries: u64,
    /// Duration of the copy operation
    pub duration: Duration,
}

impl CopyStats {
    /// Whether every visited entry was either copied or deliberately skipped.
    pub fn is_complete(&self) -> bool {
        self.failures == 0
    }
}

#[derive(Debug, Default)]
struct Counters {
    files_copied: AtomicU64,
    bytes_copied: AtomicU64,
    dirs_created: AtomicU64,
    entries_skipped: AtomicU64,
    failures: AtomicU64,
    retries: AtomicU64,
}

impl Counters {
    fn snapshot(&self, duration: Duration) -> CopyStats {
        CopyStats {
            files_copied: self.files_copied.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            dirs_created: self.dirs_created.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            duration,
        }
    }
}

/// State shared (read-only, apart from atomic counters) by every task of one run.
pub(crate) struct Engine<'a> {
    options: &'a CopyOptions,
    reporter: &'a dyn Reporter,
    batcher: Batcher,
    counters: Counters,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(options: &'a CopyOptions, reporter: &'a dyn Reporter) -> Self {
        Self {
            options,
            reporter,
            batcher: Batcher::new(options.batch_size),
            counters: Counters::default(),
        }
    }

    pub(crate) fn options(&self) -> &CopyOptions {
        self.options
    }

    /// Run one filesystem call under the retry policy.
    pub(crate) fn retry<T, F>(&self, op: FsOp, path: &Path, f: F) -> Result<T>
    where
        F: FnMut() -> io::Result<T>,
    {
        self.options.retry.run_with(
            op,
            path,
            |retry, delay| {
                self.counters.retries.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    path = %path.display(),
                    retry,
                    ?delay,
                    "resource exhausted, retrying {}",
                    op
                );
            },
            f,
        )
    }

    /// Execute one task to completion, reporting instead of returning failure.
    pub(crate) fn execute(&self, task: CopyTask) {
        let result = match task.kind() {
            TaskKind::File => self.copy_file(&task),
            TaskKind::Directory => dir::replicate_dir(self, &task),
        };

        if let Err(e) = result {
            self.fail(&e);
        }
    }

    fn copy_file(&self, task: &CopyTask) -> Result<()> {
        let bytes = file::copy_file(self, task)?;
        let counters = &self.counters;
        counters.files_copied.fetch_add(1, Ordering::Relaxed);
        counters.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
        self.reporter.file_copied(task, bytes);
        Ok(())
    }

    pub(crate) fn fail(&self, error: &Error) {
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        self.reporter.failed(error.path(), error);
    }

    pub(crate) fn skip(&self, path: &Path, kind: EntryKind) {
        let skipped = &self.counters.entries_skipped;
        skipped.fetch_add(1, Ordering::Relaxed);
        self.reporter.skipped(path, kind);
    }

    pub(crate) fn dir_ready(&self, task: &CopyTask, created: bool) {
        if created {
            self.counters.dirs_created.fetch_add(1, Ordering::Relaxed);
        }
        self.reporter.dir_ready(task, created);
    }

    /// Launch `tasks` in bounded batches and wait for all of them.
    pub(crate) fn dispatch<I>(&self, tasks: I) -> usize
    where
        I: Iterator<Item = CopyTask> + Send,
    {
        self.batcher.run(tasks, |task| self.execute(task)).jobs
    }

    fn stats(&self, duration: Duration) -> CopyStats {
        self.counters.snapshot(duration)
    }
}

/// Copy a file or directory tree, logging failures through `tracing`.
///
/// See [`copy_tree_with_reporter`].
pub fn copy_tree(src: &Path, dst: &Path, options: &CopyOptions) -> Result<CopyStats> {
    copy_tree_with_reporter(src, dst, options, &TracingReporter)
}

/// Copy a file or directory tree, sending per-entry outcomes to `reporter`.
///
/// The source is canonicalized; a destination that is the source or lies
/// inside it is rejected. A directory root is replicated recursively (files
/// keep their permission bits, directories get `0755`); a regular-file root
/// is copied directly. The call blocks until the whole tree is done.
///
/// # Errors
///
/// Only setup problems are returned:
/// - [`Error::SourceResolve`] if the source cannot be canonicalized
/// - [`Error::DestinationInsideSource`] if the destination is inside the source
/// - [`Error::SourceMetadata`] if the source root cannot be inspected
/// - [`Error::UnsupportedRoot`] if the root is neither a file nor a directory
/// - [`Error::PathTooLong`] / [`Error::Io`] if the root paths are unusable
///
/// Failures while copying, including the root task's own, are passed to
/// `reporter` and counted in [`CopyStats::failures`].
pub fn copy_tree_with_reporter(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    reporter: &dyn Reporter,
) -> Result<CopyStats> {
    let start_time = Instant::now();
    let root = guard::root_task(src, dst, options.max_path_len)?;
    tracing::debug!(
        src = %root.src().display(),
        dst = %root.dst().display(),
        kind = ?root.kind(),
        "starting copy"
    );

    let engine = Engine::new(options, reporter);
    let run = || engine.execute(root);

    let stack_size = worker_stack_size(options.max_path_len);
    let pool = build_pool(options.parallel, stack_size).or_else(|e| {
        tracing::warn!("Failed to create thread pool ({e}), retrying with one worker");
        build_pool(1, stack_size)
    });
    match pool {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!("Failed to create thread pool ({e}), using global pool");
            rayon::scope(|_| run());
        }
    }

    let stats = engine.stats(start_time.elapsed());
    tracing::debug!(?stats, "copy finished");
    Ok(stats)
}

/// Stack reserved on a worker thread for each level of directory nesting.
const STACK_PER_LEVEL: usize = 16 * 1024;
const MIN_WORKER_STACK: usize = 8 * 1024 * 1024;
const MAX_WORKER_STACK: usize = 256 * 1024 * 1024;

/// Stack size for pool threads.
///
/// A worker waiting for a batch runs queued children on its own stack, so a
/// single thread can hold every level of a directory chain at once. The
/// deepest chain that fits in `max_path_len` bytes has `max_path_len / 2`
/// levels.
fn worker_stack_size(max_path_len: usize) -> usize {
    (max_path_len / 2)
        .saturating_mul(STACK_PER_LEVEL)
        .clamp(MIN_WORKER_STACK, MAX_WORKER_STACK)
}

type PoolResult = std::result::Result<ThreadPool, ThreadPoolBuildError>;

fn build_pool(threads: usize, stack_size: usize) -> PoolResult {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(stack_size)
        .thread_name(|i| format!("treecopy-{i}"))
        .build()
}

// =============================================================================
// Tests
// =============================================================================
