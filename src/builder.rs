//! Builder API for ergonomic copying operations.
//!
//! The builder pattern provides a fluent interface for configuring and executing
//! copy operations. This is often more convenient than manually constructing
//! [`CopyOptions`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! // Copy with defaults: 16 workers, batches of 64
//! let stats = CopyBuilder::new("src", "dst").run()?;
//! println!("Copied {} files", stats.files_copied);
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use std::sync::Arc;
//! use treecopy::{CollectingReporter, CopyBuilder, RetryPolicy};
//!
//! let reporter = Arc::new(CollectingReporter::new());
//! let stats = CopyBuilder::new("src", "dst")
//!     .parallel(8)
//!     .batch_size(32)
//!     .retry(RetryPolicy::default().with_max_retries(3))
//!     .reporter(reporter.clone())
//!     .run()?;
//!
//! for (path, message) in reporter.failures() {
//!     eprintln!("{}: {}", path.display(), message);
//! }
//! # Ok::<(), treecopy::Error>(())
//! ```

use crate::copy::{CopyStats, copy_tree_with_reporter};
use crate::error::Result;
use crate::options::CopyOptions;
use crate::reporter::{Reporter, TracingReporter};
use crate::retry::RetryPolicy;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for configuring and executing copy operations.
///
/// `CopyBuilder` provides a fluent interface that is often more ergonomic than
/// constructing [`CopyOptions`] manually. The source may be a file or a
/// directory; the right handler is picked when [`run`](Self::run) is called.
///
/// # Example
///
/// ```no_run
/// use treecopy::CopyBuilder;
///
/// let stats = CopyBuilder::new("/data/project", "/backup/project")
///     .parallel(32)
///     .run()?;
/// # Ok::<(), treecopy::Error>(())
/// ```
#[derive(Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
    reporter: Option<Arc<dyn Reporter>>,
}

impl fmt::Debug for CopyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyBuilder")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("options", &self.options)
            .field("custom_reporter", &self.reporter.is_some())
            .finish()
    }
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given source and destination paths.
    ///
    /// Uses default options and reports through `tracing`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: CopyOptions::default(),
            reporter: None,
        }
    }

    /// Set the number of worker threads.
    ///
    /// Default is 16. Set to 1 for sequential copying.
    #[must_use]
    pub fn parallel(mut self, threads: usize) -> Self {
        self.options = self.options.with_parallel(threads);
        self
    }

    /// Set how many children of one directory run per batch.
    ///
    /// Default is 64.
    #[must_use]
    pub fn batch_size(mut self, k: usize) -> Self {
        self.options = self.options.with_batch_size(k);
        self
    }

    /// Set the retry policy for transient resource exhaustion.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use treecopy::{CopyBuilder, RetryPolicy};
    ///
    /// // Keep waiting for descriptors no matter how long it takes
    /// let stats = CopyBuilder::new("src", "dst")
    ///     .retry(RetryPolicy::unbounded(Duration::from_secs(1)))
    ///     .run()?;
    /// # Ok::<(), treecopy::Error>(())
    /// ```
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.options = self.options.with_retry(policy);
        self
    }

    /// Set the path length limit.
    #[must_use]
    pub fn max_path_len(mut self, max: usize) -> Self {
        self.options = self.options.with_max_path_len(max);
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// Send per-entry outcomes to `reporter` instead of `tracing`.
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Get a reference to the current options.
    pub fn copy_options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute the copy operation.
    ///
    /// # Errors
    ///
    /// Returns the setup errors of [`copy_tree`](crate::copy_tree). Failures
    /// inside the tree go to the reporter and [`CopyStats::failures`].
    pub fn run(self) -> Result<CopyStats> {
        match &self.reporter {
            Some(reporter) => {
                copy_tree_with_reporter(&self.src, &self.dst, &self.options, reporter.as_ref())
            }
            None => copy_tree_with_reporter(&self.src, &self.dst, &self.options, &TracingReporter),
        }
    }
}
