//! # treecopy
//!
//! Concurrent recursive copying of a file or directory tree.
//!
//! ## Core Features
//!
//! - **Per-entry concurrency**: every file and subdirectory is its own task,
//!   so I/O on siblings and on separate subtrees overlaps
//! - **Bounded fan-out**: a directory launches its children in batches of at
//!   most `batch_size` and joins each batch before starting the next
//! - **Global ceiling**: all tasks share one fixed-size worker pool
//! - **Descriptor-exhaustion tolerant**: `EMFILE`/`ENFILE`/`EAGAIN` are retried
//!   with exponential back-off instead of failing the copy
//! - **Failure isolation**: a failed entry is reported and its siblings carry on
//! - **Permission preserving**: files keep their mode bits; directories get `0755`
//! - **Self-copy guard**: a destination inside the source is rejected, also
//!   when reached through a symlink
//!
//! Timestamps, ownership, extended attributes and links are not copied.
//! Symlinks, FIFOs, sockets and device nodes inside the tree are skipped.
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! let stats = CopyBuilder::new("src", "dst").run()?;
//! println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use treecopy::{copy_tree, CopyOptions, RetryPolicy};
//! use std::path::Path;
//!
//! let options = CopyOptions::default()
//!     .with_parallel(8)
//!     .with_batch_size(64)
//!     .with_retry(RetryPolicy::default().with_max_retries(20));
//!
//! let stats = copy_tree(Path::new("src"), Path::new("dst"), &options)?;
//! if !stats.is_complete() {
//!     eprintln!("{} entries could not be copied", stats.failures);
//! }
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Error Reporting
//!
//! Only setup problems (unresolvable source, destination inside source,
//! unsupported root) are returned as [`Error`]. Everything that goes wrong
//! further down is handed to a [`Reporter`]: [`TracingReporter`] by default,
//! or [`CollectingReporter`] to inspect failures programmatically.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress spinner support with indicatif |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and [`CopyStats`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod guard;
mod options;
mod reporter;
mod retry;
mod task;
mod utils;

#[cfg(feature = "progress")]
mod progress;

pub use builder::CopyBuilder;
pub use copy::{COPY_BUFFER_SIZE, CopyStats, copy_tree, copy_tree_with_reporter};
pub use error::{Error, FsOp, Result, is_transient_error};
pub use options::{CopyOptions, DEFAULT_BATCH_SIZE, DEFAULT_PARALLEL};
pub use reporter::{CollectingReporter, ReportEvent, Reporter, TracingReporter};
pub use retry::RetryPolicy;
pub use task::{CopyTask, DEFAULT_MAX_PATH_LEN, EntryKind, EntryMetadata, TaskKind};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{ProgressReporter, create_spinner};
