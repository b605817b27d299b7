//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`] for configuring the copy engine.
//!
//! # Example
//!
//! ```
//! use treecopy::{CopyOptions, RetryPolicy};
//!
//! let options = CopyOptions::default()
//!     .with_parallel(8)
//!     .with_batch_size(32)
//!     .with_retry(RetryPolicy::default().with_max_retries(3));
//! ```

use crate::retry::RetryPolicy;
use crate::task::DEFAULT_MAX_PATH_LEN;

/// Default number of children launched per batch in one directory.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Default number of worker threads.
pub const DEFAULT_PARALLEL: usize = 16;

/// Options for copy operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `parallel` | 16 | Worker threads shared by the whole tree |
/// | `batch_size` | 64 | Children launched per batch in one directory |
/// | `retry` | 10 retries, 100ms doubling to 2s | Transient error policy |
/// | `max_path_len` | 4096 | Byte limit for any path (exclusive) |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Number of worker threads (default: 16)
    ///
    /// This is the global ceiling on concurrently running tasks, no matter
    /// how many directories are being traversed at once.
    pub parallel: usize,

    /// Maximum children in flight per batch in one directory (default: 64)
    ///
    /// A directory launches at most this many children, waits for all of
    /// them, then launches the next batch.
    pub batch_size: usize,

    /// Retry policy for transient resource exhaustion
    pub retry: RetryPolicy,

    /// Paths whose byte length reaches this limit are rejected (default: 4096)
    pub max_path_len: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

impl CopyOptions {
    /// Set the number of worker threads
    ///
    /// Value is clamped to at least 1 to prevent panics.
    #[must_use]
    pub fn with_parallel(mut self, n: usize) -> Self {
        self.parallel = n.max(1);
        self
    }

    /// Set the per-directory batch size
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, k: usize) -> Self {
        self.batch_size = k.max(1);
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the path length limit
    #[must_use]
    pub fn with_max_path_len(mut self, max: usize) -> Self {
        self.max_path_len = max;
        self
    }
}
