//! End-to-end CLI tests for the mote binary.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("mote").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--guild-id"));
}

/// Test that invoking without a source fails with a usage error.
#[test]
fn test_binary_requires_source() {
    let mut cmd = Command::cargo_bin("mote").unwrap();
    cmd.args(["--guild-id", "42", "--token", "tok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that an unrecognized source URL fails fast without any network.
#[test]
fn test_binary_rejects_unrecognized_source() {
    let mut cmd = Command::cargo_bin("mote").unwrap();
    cmd.args([
        "https://example.com/not-an-emote",
        "--guild-id",
        "42",
        "--token",
        "tok",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid source URL"));
}
