//! Error types for treecopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during copy operations, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | IO | [`Error::Io`], [`Error::ResourceExhausted`] |
//! | Paths | [`Error::PathTooLong`] |
//! | Setup | [`Error::SourceResolve`], [`Error::SourceMetadata`], [`Error::DestinationInsideSource`], [`Error::UnsupportedRoot`] |
//!
//! Setup errors are returned from the entry points. Everything else happens
//! inside a single task and is handed to the [`Reporter`](crate::Reporter)
//! instead of being propagated.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::task::EntryKind;

/// Result type for treecopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error is transient resource exhaustion.
///
/// Transient errors are worth retrying after a pause: the process (or the
/// whole system) ran out of file descriptors, or the kernel asked us to try
/// again later.
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `EMFILE`, `ENFILE`, `EAGAIN` |
/// | All | [`io::ErrorKind::WouldBlock`] |
///
/// # Example
///
/// ```
/// use std::io;
/// use treecopy::is_transient_error;
///
/// let error = io::Error::new(io::ErrorKind::WouldBlock, "try again");
/// assert!(is_transient_error(&error));
/// ```
pub fn is_transient_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return matches!(raw_error, libc::EMFILE | libc::ENFILE | libc::EAGAIN);
        }
    }

    false
}

/// The filesystem operation that failed.
///
/// Carried by [`Error::Io`] and [`Error::ResourceExhausted`] so that a
/// diagnostic line says what was being attempted, not only which path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    /// Opening a source file for reading
    OpenSource,
    /// Creating or truncating a destination file
    CreateDestination,
    /// Reading file contents
    Read,
    /// Writing file contents
    Write,
    /// Applying permission bits to a destination entry
    SetPermissions,
    /// Opening a directory stream
    OpenDir,
    /// Creating a destination directory
    CreateDir,
    /// Pulling the next entry from a directory stream
    ReadDirEntry,
    /// Reading an entry's metadata
    Inspect,
    /// Resolving the destination path
    ResolveDestination,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OpenSource => "open source file",
            Self::CreateDestination => "create destination file",
            Self::Read => "read",
            Self::Write => "write",
            Self::SetPermissions => "set permissions on",
            Self::OpenDir => "open directory",
            Self::CreateDir => "create directory",
            Self::ReadDirEntry => "read entry of directory",
            Self::Inspect => "inspect",
            Self::ResolveDestination => "resolve destination",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during copy operations.
///
/// All errors include relevant path information to aid debugging.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A filesystem operation failed with a permanent error
    #[error("cannot {op} {}: {source}", path.display())]
    Io {
        /// What was being attempted
        op: FsOp,
        /// The offending path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Transient resource exhaustion persisted past the retry bound
    #[error("cannot {op} {}: {source} (gave up after {attempts} attempts)", path.display())]
    ResourceExhausted {
        /// What was being attempted
        op: FsOp,
        /// The offending path
        path: PathBuf,
        /// Total number of attempts made, including the first one
        attempts: u32,
        /// The last transient error observed
        source: io::Error,
    },

    /// A composed path exceeds the configured length limit
    #[error("path too long ({len} bytes, limit {max}): {}", path.display())]
    PathTooLong {
        /// The rejected path
        path: PathBuf,
        /// Its length in bytes
        len: usize,
        /// The configured limit
        max: usize,
    },

    /// The source path could not be canonicalized
    #[error("cannot resolve source {}: {source}", path.display())]
    SourceResolve {
        /// Source path as given
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The canonical source root could not be inspected
    #[error("cannot stat source {}: {source}", path.display())]
    SourceMetadata {
        /// Canonical source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The destination is the source or lies inside it
    #[error(
        "destination {} is inside source {}",
        destination.display(),
        source_root.display()
    )]
    DestinationInsideSource {
        /// Canonical source path
        source_root: PathBuf,
        /// Destination path
        destination: PathBuf,
    },

    /// The source root is neither a regular file nor a directory
    #[error("source is neither file nor directory ({kind}): {}", path.display())]
    UnsupportedRoot {
        /// Canonical source path
        path: PathBuf,
        /// What the root actually is
        kind: EntryKind,
    },
}

impl Error {
    pub(crate) fn io(op: FsOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// The underlying OS error, if this error wraps one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. }
            | Self::ResourceExhausted { source, .. }
            | Self::SourceResolve { source, .. }
            | Self::SourceMetadata { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The path this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::ResourceExhausted { path, .. }
            | Self::PathTooLong { path, .. }
            | Self::SourceResolve { path, .. }
            | Self::SourceMetadata { path, .. }
            | Self::UnsupportedRoot { path, .. } => path,
            Self::DestinationInsideSource { destination, .. } => destination,
        }
    }

    /// Whether this error came from transient resource exhaustion.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}
