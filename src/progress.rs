//! Progress reporting support (requires `progress` feature)

use crate::error::Error;
use crate::reporter::Reporter;
use crate::task::{CopyTask, EntryKind};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Create a spinner for a copy whose size is not known up front
#[must_use]
pub fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} files, {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Ticks a progress bar for every copied file, then forwards to `inner`.
///
/// Failure and skip lines are printed above the bar so they are not
/// overwritten by the next redraw.
pub struct ProgressReporter<R> {
    bar: ProgressBar,
    bytes: AtomicU64,
    inner: R,
}

impl<R: Reporter> ProgressReporter<R> {
    /// Wrap `inner`, drawing on `bar`
    pub fn new(bar: ProgressBar, inner: R) -> Self {
        Self {
            bar,
            bytes: AtomicU64::new(0),
            inner,
        }
    }

    /// Stop the bar, leaving its last state on screen
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl<R: Reporter> Reporter for ProgressReporter<R> {
    fn failed(&self, path: &Path, error: &Error) {
        self.bar.suspend(|| self.inner.failed(path, error));
    }

    fn skipped(&self, path: &Path, kind: EntryKind) {
        self.bar.suspend(|| self.inner.skipped(path, kind));
    }

    fn file_copied(&self, task: &CopyTask, bytes: u64) {
        let total = self.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.bar.inc(1);
        self.bar.set_message(HumanBytes(total).to_string());
        self.inner.file_copied(task, bytes);
    }

    fn dir_ready(&self, task: &CopyTask, created: bool) {
        self.inner.dir_ready(task, created);
    }
}
