//! Error handling integration tests for treecp CLI.
//!
//! Setup errors (bad arguments, unusable source, destination inside the
//! source) exit with status 1 before anything is written. Failures of
//! individual entries are printed but leave the exit status at 0.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, treecp};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_missing_arguments() {
    treecp().assert().failure().code(1);

    let fx = TestFixture::new();
    treecp().arg(fx.src.path()).assert().failure().code(1);
}

#[test]
fn test_too_many_arguments() {
    let fx = TestFixture::new();
    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .arg(fx.dst.path().join("extra"))
        .assert()
        .failure()
        .code(1);

    assert!(!fx.target().exists());
}

#[test]
fn test_nonexistent_source() {
    let fx = TestFixture::new();

    treecp()
        .arg(fx.src.path().join("missing"))
        .arg(fx.target())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot resolve source"));

    assert!(!fx.target().exists());
}

#[test]
fn test_destination_inside_source_rejected() {
    let fx = TestFixture::new();
    fx.create_files("", 3, 10);

    treecp()
        .arg(fx.src.path())
        .arg(fx.src.path().join("backup"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is inside source"));

    assert!(!fx.src.path().join("backup").exists());
}

#[test]
fn test_destination_equal_to_source_rejected() {
    let fx = TestFixture::new();
    fx.create_files("", 1, 10);

    treecp()
        .arg(fx.src.path())
        .arg(fx.src.path())
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_zero_jobs_rejected() {
    let fx = TestFixture::new();

    treecp()
        .args(["-j", "0"])
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--jobs"));
}

#[cfg(unix)]
#[test]
fn test_socket_root_rejected() {
    use std::os::unix::net::UnixListener;

    let fx = TestFixture::new();
    let sock = fx.src.path().join("sock");
    let _listener = UnixListener::bind(&sock).unwrap();

    treecp()
        .arg(&sock)
        .arg(fx.target())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("neither file nor directory"));

    assert!(!fx.target().exists());
}

/// An unreadable file is reported, its siblings are still copied, and the
/// exit status stays 0.
#[cfg(unix)]
#[test]
fn test_unreadable_file_reported_but_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    if common::running_as_root() {
        return;
    }

    let fx = TestFixture::new();
    fs::write(fx.src.path().join("ok.txt"), "fine").unwrap();
    let secret = fx.src.path().join("secret.txt");
    fs::write(&secret, "hidden").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
    let _guard = scopeguard::guard(&secret, |path| {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o644));
    });

    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot open source file"))
        .stderr(predicate::str::contains("secret.txt"));

    fx.assert_file_content(&fx.target().join("ok.txt"), "fine");
    assert!(!fx.target().join("secret.txt").exists());
}

/// An unreadable subdirectory is reported and nothing of it is copied; the
/// rest of the tree is.
#[cfg(unix)]
#[test]
fn test_unreadable_directory_isolated() {
    use std::os::unix::fs::PermissionsExt;

    if common::running_as_root() {
        return;
    }

    let fx = TestFixture::new();
    fx.create_files("open", 2, 10);
    fx.create_files("locked", 2, 10);
    let locked = fx.src.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let _guard = scopeguard::guard(&locked, |path| {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o755));
    });

    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stderr(predicate::str::contains("locked"));

    assert!(fx.target().join("open/file0.txt").exists());
    assert!(fx.target().join("open/file1.txt").exists());
    assert!(!fx.target().join("locked").exists());
}

#[test]
fn test_path_too_long_reported() {
    let fx = TestFixture::new();
    fs::write(fx.src.path().join("a-rather-long-file-name.txt"), "x").unwrap();
    fs::write(fx.src.path().join("b"), "y").unwrap();

    let limit = fx.target().join("b").as_os_str().len() + 4;
    treecp()
        .arg("--max-path-len")
        .arg(limit.to_string())
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stderr(predicate::str::contains("path too long"));

    fx.assert_file_content(&fx.target().join("b"), "y");
    assert!(!fx.target().join("a-rather-long-file-name.txt").exists());
}

#[test]
fn test_quiet_still_prints_failures() {
    let fx = TestFixture::new();
    fs::write(fx.src.path().join("a-rather-long-file-name.txt"), "x").unwrap();
    fs::write(fx.src.path().join("b"), "y").unwrap();

    let limit = fx.target().join("b").as_os_str().len() + 4;
    treecp()
        .arg("-q")
        .arg("--max-path-len")
        .arg(limit.to_string())
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("path too long"))
        .stderr(predicate::function(|err: &str| {
            err.matches("a-rather-long-file-name.txt").count() == 1
        }))
        .stderr(predicate::str::contains("1 entries could not be copied"));

    fx.assert_file_content(&fx.target().join("b"), "y");
}

/// Running out of descriptors deep in a chain gives up on that entry after
/// the configured retries; everything reachable with the descriptors left is
/// still copied.
#[cfg(unix)]
#[test]
fn test_descriptor_exhaustion_fails_single_entries() {
    let fx = TestFixture::new();
    fx.create_files("", 3, 16);
    let mut level = fx.src.path().to_path_buf();
    for depth in 0..40 {
        level.push(format!("d{}", depth));
        fs::create_dir(&level).unwrap();
        fs::write(level.join("f"), depth.to_string()).unwrap();
    }

    common::treecp_with_fd_limit(16)
        .args(["-v", "-j", "1", "--batch-size", "1", "--max-retries", "2"])
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stderr(predicate::str::contains("gave up after 3 attempts"))
        .stdout(predicate::str::is_match(r"Retries:\s+[1-9]").unwrap())
        .stdout(predicate::str::is_match(r"Failed:\s+[1-9]").unwrap());

    let content = "x".repeat(16);
    for i in 0..3 {
        let name = format!("file{}.txt", i);
        fx.assert_file_content(&fx.target().join(name), &content);
    }
    fx.assert_file_content(&fx.target().join("d0/f"), "0");
    let relative = level.strip_prefix(fx.src.path()).unwrap();
    assert!(!fx.target().join(relative).join("f").exists());
}
