//! Units of work and entry classification.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::{FileType, Metadata};
use std::path::{Path, PathBuf};

/// Default limit on the byte length of any source or destination path.
///
/// Matches `PATH_MAX` on Linux, which counts the terminating NUL, so the
/// longest accepted path is one byte shorter.
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

/// Which handler runs a [`CopyTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Copy one regular file
    File,
    /// Replicate one directory and dispatch its children
    Directory,
}

/// One source path paired with one destination path.
///
/// A task is moved into the worker that executes it and dropped when that
/// worker finishes, so no two workers ever share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    src: PathBuf,
    dst: PathBuf,
    kind: TaskKind,
}

impl CopyTask {
    /// Create a task, rejecting paths whose byte length reaches `max_len`.
    pub fn new(
        src: impl Into<PathBuf>,
        dst: impl Into<PathBuf>,
        kind: TaskKind,
        max_len: usize,
    ) -> Result<Self> {
        let src = src.into();
        let dst = dst.into();
        check_path_len(&src, max_len)?;
        check_path_len(&dst, max_len)?;
        Ok(Self { src, dst, kind })
    }

    /// Create a task from paths whose lengths the caller has already checked
    /// with [`check_path_len`].
    pub(crate) fn from_checked(src: PathBuf, dst: PathBuf, kind: TaskKind) -> Self {
        Self { src, dst, kind }
    }

    /// Source path
    pub fn src(&self) -> &Path {
        &self.src
    }

    /// Destination path
    pub fn dst(&self) -> &Path {
        &self.dst
    }

    /// Handler kind
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}

/// Reject `path` if its byte length reaches `max`.
pub(crate) fn check_path_len(path: &Path, max: usize) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= max {
        return Err(Error::PathTooLong {
            path: path.to_path_buf(),
            len,
            max,
        });
    }
    Ok(())
}

/// What kind of filesystem entry was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (never followed)
    Symlink,
    /// Named pipe
    Fifo,
    /// Unix domain socket
    Socket,
    /// Block device node
    BlockDevice,
    /// Character device node
    CharDevice,
    /// Anything the platform cannot classify
    Unknown,
}

impl EntryKind {
    /// Classify a file type as reported by `lstat`.
    pub fn from_file_type(ft: FileType) -> Self {
        if ft.is_file() {
            return Self::File;
        }
        if ft.is_dir() {
            return Self::Directory;
        }
        if ft.is_symlink() {
            return Self::Symlink;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_fifo() {
                return Self::Fifo;
            }
            if ft.is_socket() {
                return Self::Socket;
            }
            if ft.is_block_device() {
                return Self::BlockDevice;
            }
            if ft.is_char_device() {
                return Self::CharDevice;
            }
        }

        Self::Unknown
    }

    /// The handler for this kind, or `None` if entries of this kind are skipped.
    pub fn task_kind(self) -> Option<TaskKind> {
        match self {
            Self::File => Some(TaskKind::File),
            Self::Directory => Some(TaskKind::Directory),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::File => "regular file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Fifo => "fifo",
            Self::Socket => "socket",
            Self::BlockDevice => "block device",
            Self::CharDevice => "character device",
            Self::Unknown => "unknown file type",
        };
        f.write_str(s)
    }
}

/// Type and permission bits of one inspected entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Entry kind
    pub kind: EntryKind,
    /// Permission bits (`st_mode & 0o7777`)
    pub mode: u32,
}

impl From<&Metadata> for EntryMetadata {
    fn from(meta: &Metadata) -> Self {
        Self {
            kind: EntryKind::from_file_type(meta.file_type()),
            mode: permission_bits(meta),
        }
    }
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
