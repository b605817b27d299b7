//! Retrying OS calls through transient resource exhaustion.
//!
//! Every blocking filesystem call made by the copy engine goes through
//! [`RetryPolicy::run`]. When the call fails because the process ran out of
//! file descriptors (or the kernel returned `EAGAIN`), the calling thread
//! sleeps and tries again. Permanent errors are returned immediately.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use treecopy::RetryPolicy;
//!
//! // Up to 5 retries, starting at 10ms and doubling up to 500ms
//! let policy = RetryPolicy::default()
//!     .with_max_retries(5)
//!     .with_initial_delay(Duration::from_millis(10))
//!     .with_max_delay(Duration::from_millis(500));
//!
//! // Retry forever with a fixed one-second pause
//! let patient = RetryPolicy::unbounded(Duration::from_secs(1));
//! assert_eq!(patient.max_retries, None);
//! ```

use crate::error::{Error, FsOp, Result, is_transient_error};
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// How transient resource exhaustion is retried.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `max_retries` | `Some(10)` | Retries before giving up |
/// | `initial_delay` | 100ms | Pause before the first retry |
/// | `max_delay` | 2s | Cap on the doubling pause |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (`None` = unbounded)
    pub max_retries: Option<u32>,

    /// Pause before the first retry
    pub initial_delay: Duration,

    /// Upper bound on the pause; each retry doubles the previous pause
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(10),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Retry forever, pausing `delay` between attempts.
    #[must_use]
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_retries: None,
            initial_delay: delay,
            max_delay: delay,
        }
    }

    /// Never retry: the first transient failure is reported.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: Some(0),
            ..Self::default()
        }
    }

    /// Set the retry bound
    #[must_use]
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Set the first pause
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the pause cap
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Pause before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay.max(self.initial_delay))
    }

    /// Run `f`, retrying while it fails with transient resource exhaustion.
    ///
    /// `op` and `path` only label the returned error.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] for the first non-transient failure
    /// - [`Error::ResourceExhausted`] once the retry bound is used up
    pub fn run<T, F>(&self, op: FsOp, path: &Path, f: F) -> Result<T>
    where
        F: FnMut() -> io::Result<T>,
    {
        self.run_with(op, path, |_, _| {}, f)
    }

    /// Like [`run`](Self::run), calling `on_retry(retry, delay)` before each pause.
    pub fn run_with<T, F, R>(&self, op: FsOp, path: &Path, mut on_retry: R, mut f: F) -> Result<T>
    where
        F: FnMut() -> io::Result<T>,
        R: FnMut(u32, Duration),
    {
        let mut retries: u32 = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if is_transient_error(&e) => {
                    if self.max_retries.is_some_and(|max| retries >= max) {
                        return Err(Error::ResourceExhausted {
                            op,
                            path: path.to_path_buf(),
                            attempts: retries.saturating_add(1),
                            source: e,
                        });
                    }
                    retries = retries.saturating_add(1);
                    let delay = self.delay_for(retries);
                    on_retry(retries, delay);
                    thread::sleep(delay);
                }
                Err(e) => return Err(Error::io(op, path, e)),
            }
        }
    }
}
