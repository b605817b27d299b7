//! Platform helpers for creating destination entries with exact modes.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Mode given to every destination directory.
pub(crate) const DIR_MODE: u32 = 0o755;

/// Open `path` for writing, creating it with `mode` or truncating it.
#[cfg(unix)]
pub(crate) fn open_destination(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
pub(crate) fn open_destination(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Apply `mode` to an open file, bypassing the umask.
#[cfg(unix)]
pub(crate) fn set_file_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub(crate) fn set_file_mode(file: &File, mode: u32) -> io::Result<()> {
    let mut perms = file.metadata()?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    file.set_permissions(perms)
}

/// Create a directory with [`DIR_MODE`].
///
/// Returns `Ok(false)` if something already exists at `path`.
pub(crate) fn create_dir(path: &Path) -> io::Result<bool> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    match builder.create(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Force [`DIR_MODE`] on a directory we just created, undoing the umask.
#[cfg(unix)]
pub(crate) fn set_dir_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(DIR_MODE))
}

#[cfg(not(unix))]
pub(crate) fn set_dir_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}
