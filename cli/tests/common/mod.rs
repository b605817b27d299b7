//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Destination path for the copy (does not exist yet).
    pub fn target(&self) -> PathBuf {
        self.dst.path().join("copy")
    }

    /// Create `count` files of `size` bytes directly in `dir` (relative to the source).
    pub fn create_files(&self, dir: &str, count: usize, size: usize) {
        let base = self.src.path().join(dir);
        fs::create_dir_all(&base).expect("Failed to create directory");
        let content = "x".repeat(size);
        for i in 0..count {
            fs::write(base.join(format!("file{}.txt", i)), &content)
                .expect("Failed to write file");
        }
    }

    /// Create a nested directory structure with files.
    pub fn create_nested_structure(&self, depth: usize, files_per_level: usize) {
        let mut current_path = self.src.path().to_path_buf();
        for level in 0..depth {
            current_path = current_path.join(format!("level{}", level));
            fs::create_dir_all(&current_path).expect("Failed to create directory");
            for i in 0..files_per_level {
                fs::write(
                    current_path.join(format!("file{}.txt", i)),
                    format!("content at level {}", level),
                )
                .expect("Failed to write file");
            }
        }
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

/// A `treecp` command with logging left at its defaults.
pub fn treecp() -> Command {
    let mut cmd = cargo_bin_cmd!("treecp");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A `treecp` command whose process may hold at most `max_fds` descriptors.
#[cfg(unix)]
pub fn treecp_with_fd_limit(max_fds: libc::rlim_t) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_treecp"));
    cmd.env_remove("RUST_LOG");
    // SAFETY: the hook only calls setrlimit, which is async-signal-safe.
    unsafe {
        cmd.pre_exec(move || {
            let limit = libc::rlimit {
                rlim_cur: max_fds,
                rlim_max: max_fds,
            };
            if libc::setrlimit(libc::RLIMIT_NOFILE, &limit) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
    Command::from_std(cmd)
}

/// Lift the soft descriptor limit towards the hard one and return it.
/// Spawned commands inherit the new limit.
#[cfg(unix)]
pub fn raise_fd_limit() -> libc::rlim_t {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: limit is a valid rlimit for getrlimit to fill in.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return 256;
    }
    let wanted = limit.rlim_max.min(65536).max(limit.rlim_cur);
    if wanted > limit.rlim_cur {
        limit.rlim_cur = wanted;
        // SAFETY: the new soft limit does not exceed the hard limit.
        if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limit) } != 0 {
            return 256;
        }
    }
    limit.rlim_cur
}

/// Count regular files under `dir`, recursively.
pub fn count_files_recursive(dir: &Path) -> usize {
    let mut count = 0;
    if dir.is_dir() {
        for entry in fs::read_dir(dir).expect("Failed to read directory") {
            let entry = entry.expect("Failed to read entry");
            let file_type = entry.file_type().expect("Failed to stat entry");
            if file_type.is_dir() {
                count += count_files_recursive(&entry.path());
            } else if file_type.is_file() {
                count += 1;
            }
        }
    }
    count
}

/// Assert that every regular file and directory in `src` exists in `dst`
/// with the same contents.
pub fn assert_trees_match(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).expect("Failed to read directory") {
        let entry = entry.expect("Failed to read entry");
        let file_type = entry.file_type().expect("Failed to stat entry");
        let target = dst.join(entry.file_name());
        if file_type.is_dir() {
            assert!(target.is_dir(), "missing directory {:?}", target);
            assert_trees_match(&entry.path(), &target);
        } else if file_type.is_file() {
            assert_eq!(
                fs::read(entry.path()).expect("Failed to read source"),
                fs::read(&target).expect("Failed to read copy"),
                "content mismatch for {:?}",
                target
            );
        }
    }
}

/// Permission bits of `path`.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .expect("Failed to stat")
        .permissions()
        .mode()
        & 0o7777
}

/// Whether the tests run with root privileges (permission checks are bypassed).
#[cfg(unix)]
pub fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}
