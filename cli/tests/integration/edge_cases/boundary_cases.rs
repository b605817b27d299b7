//! Batch boundaries, empty trees, awkward names and large files.

use crate::common::{self, TestFixture, assert_trees_match, count_files_recursive, treecp};
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[rstest]
#[case(0)]
#[case(1)]
#[case(63)]
#[case(64)]
#[case(65)]
#[case(128)]
#[case(129)]
fn test_child_count_around_batch_size(#[case] count: usize) {
    let fx = TestFixture::new();
    fx.create_files("wide", count, 8);

    treecp()
        .args(["--batch-size", "64"])
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert!(fx.target().join("wide").is_dir());
    assert_eq!(count_files_recursive(&fx.target()), count);
}

#[rstest]
#[case(1, 1)]
#[case(2, 3)]
#[case(4, 2)]
#[case(16, 64)]
fn test_jobs_and_batch_size_combinations(#[case] jobs: usize, #[case] batch: usize) {
    let fx = TestFixture::new();
    fx.create_nested_structure(5, 4);
    fx.create_files("flat", 20, 32);

    treecp()
        .arg("-j")
        .arg(jobs.to_string())
        .arg("--batch-size")
        .arg(batch.to_string())
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert_eq!(count_files_recursive(&fx.target()), 40);
    assert_trees_match(fx.src.path(), &fx.target());
}

#[test]
fn test_empty_directory() {
    let fx = TestFixture::new();

    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert!(fx.target().is_dir());
    assert_eq!(fs::read_dir(fx.target()).unwrap().count(), 0);
}

#[test]
fn test_empty_file() {
    let fx = TestFixture::new();
    fs::write(fx.src.path().join("empty"), "").unwrap();

    treecp()
        .arg(fx.src.path().join("empty"))
        .arg(fx.dst.path().join("empty"))
        .assert()
        .success();

    assert_eq!(fs::metadata(fx.dst.path().join("empty")).unwrap().len(), 0);
}

#[test]
fn test_special_filenames() {
    let fx = TestFixture::new();
    let names = [
        "with space",
        "-leading-dash",
        "unicodé-名前",
        ".hidden",
        "a'quote",
    ];
    for name in names {
        fs::write(fx.src.path().join(name), name).unwrap();
    }

    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert_eq!(count_files_recursive(&fx.target()), 5);
    assert_trees_match(fx.src.path(), &fx.target());
}

#[test]
fn test_large_file_spanning_many_buffers() {
    let fx = TestFixture::new();
    let content: Vec<u8> = (0..(3 * 1024 * 1024 + 17))
        .map(|i| (i % 251) as u8)
        .collect();
    fs::write(fx.src.path().join("big.bin"), &content).unwrap();

    treecp()
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert_eq!(fs::read(fx.target().join("big.bin")).unwrap(), content);
}

#[test]
fn test_deep_nesting() {
    let fx = TestFixture::new();
    let mut path = fx.src.path().to_path_buf();
    for i in 0..40 {
        path = path.join(format!("d{}", i));
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("leaf"), "bottom").unwrap();

    treecp()
        .args(["-j", "2", "--batch-size", "1"])
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    let relative = path.strip_prefix(fx.src.path()).unwrap();
    let copied = fx.target().join(relative);
    fx.assert_file_content(&copied.join("leaf"), "bottom");
}

/// A chain about a thousand directories deep copies without exhausting the
/// worker stacks.
#[cfg(unix)]
#[test]
fn test_thousand_level_chain() {
    let depth = (common::raise_fd_limit().saturating_sub(128) as usize).min(1000);
    let fx = TestFixture::new();
    let mut leaf = fx.src.path().to_path_buf();
    for _ in 0..depth {
        leaf.push("a");
    }
    fs::create_dir_all(&leaf).unwrap();
    fs::write(leaf.join("leaf"), "bottom").unwrap();

    treecp()
        .args(["-j", "2"])
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let relative = leaf.strip_prefix(fx.src.path()).unwrap();
    fx.assert_file_content(&fx.target().join(relative).join("leaf"), "bottom");
}

#[test]
fn test_progress_flag() {
    let fx = TestFixture::new();
    fx.create_files("", 10, 100);

    treecp()
        .arg("--progress")
        .arg(fx.src.path())
        .arg(fx.target())
        .assert()
        .success();

    assert_eq!(count_files_recursive(&fx.target()), 10);
}
