//! CLI argument validation and `mark` command tests.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use crossmark_test_support::SyntheticImageBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from any user or project config.
fn crossmark(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("crossmark").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

fn write_png(dir: &TempDir, name: &str, image: &image::DynamicImage) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, SyntheticImageBuilder::encode_png(image)).unwrap();
    path
}

// === Argument Validation ===

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve").and(predicate::str::contains("mark")));
}

#[test]
fn test_mark_requires_percentages() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .args(["mark", "photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--red"));
}

#[test]
fn test_mark_rejects_out_of_range_percent() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .args(["mark", "photo.png", "--red", "150", "--green", "1", "--blue", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "The value must be in the range from 0 to 100",
        ));
}

#[test]
fn test_mark_rejects_non_numeric_percent() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .args(["mark", "photo.png", "--red", "lots", "--green", "1", "--blue", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a valid decimal value."));
}

#[test]
fn test_mark_rejects_unknown_position() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .args(["mark", "photo.png", "--red", "1", "--green", "1", "--blue", "1"])
        .args(["--position", "diagonal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("horizontal, vertical"));
}

#[test]
fn test_mark_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("anim.gif"), b"GIF89a").unwrap();

    crossmark(dir.path())
        .args(["mark", "anim.gif", "--red", "1", "--green", "1", "--blue", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Incorrect image format"));
}

#[test]
fn test_mark_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    crossmark(dir.path())
        .args(["mark", "nope.png", "--red", "1", "--green", "1", "--blue", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read"));
}

// === Marking ===

#[test]
fn test_mark_draws_cross_and_prints_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let image = SyntheticImageBuilder::bright_spot(40, 40, 10, 10, 6, 6);
    let input = write_png(&dir, "spot.png", &image);
    let static_dir = dir.path().join("out");

    let output = crossmark(dir.path())
        .arg("mark")
        .arg(&input)
        .args(["--red", "100", "--green", "100", "--blue", "100"])
        .args(["--position", "vertical", "--original-colors", "--processed-colors"])
        .arg("--static-dir")
        .arg(&static_dir)
        .assert()
        .code(0)
        .get_output()
        .stdout
        .clone();

    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(outcome["upload"]["url"], "/static/spot.png");
    assert_eq!(outcome["marked"]["url"], "/static/markspot.png");
    assert_eq!(
        outcome["original_colors"]["url"],
        "/static/vertical_colors_.png"
    );
    assert_eq!(
        outcome["processed_colors"]["url"],
        "/static/vertical_colors_new_.png"
    );
    assert_eq!(outcome["mark"]["center"], serde_json::json!([13, 13]));

    for name in [
        "spot.png",
        "markspot.png",
        "vertical_colors_.png",
        "vertical_colors_new_.png",
    ] {
        assert!(static_dir.join(name).exists(), "{name} not written");
    }
}

#[test]
fn test_mark_without_qualifying_pixel_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_png(&dir, "split.png", &SyntheticImageBuilder::red_blue_split(20, 20));
    let static_dir = dir.path().join("out");

    crossmark(dir.path())
        .arg("mark")
        .arg(&input)
        .args(["--red", "100", "--green", "100", "--blue", "100"])
        .arg("--original-colors")
        .arg("--static-dir")
        .arg(&static_dir)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"marked\":null"));

    assert!(static_dir.join("split.png").exists());
    assert!(!static_dir.join("marksplit.png").exists());
    assert!(!static_dir.join("horizontal_colors_.png").exists());
}

#[test]
fn test_mark_pretty_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_png(&dir, "gray.png", &SyntheticImageBuilder::gray(16, 16));

    crossmark(dir.path())
        .arg("mark")
        .arg(&input)
        .args(["--red", "0", "--green", "0", "--blue", "0", "--pretty"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("{\n"));

    // default static dir is relative to the working directory
    assert!(dir.path().join("static").join("markgray.png").exists());
}
