//! Integration tests for the codespace CLI.
//!
//! These tests verify the CLI binary behavior by running the actual
//! executable and checking output, exit codes, and file system effects.
//! Nothing here needs a Docker daemon.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// -----------------------------------------------------------------------------
// Test helpers
// -----------------------------------------------------------------------------

/// Creates a Command for the codespace binary.
#[allow(deprecated)]
fn codespace() -> Command {
    Command::cargo_bin("codespace").expect("failed to find codespace binary")
}

/// Creates a Command for codespace running in a specific directory.
fn codespace_in(dir: &TempDir) -> Command {
    let mut cmd = codespace();
    cmd.current_dir(dir.path());
    cmd
}

// -----------------------------------------------------------------------------
// Help and version tests
// -----------------------------------------------------------------------------

#[test]
fn test_help_shows_all_commands() {
    codespace()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("codespace"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("languages"))
        .stdout(predicate::str::contains("image"));
}

#[test]
fn test_version_shows_version() {
    codespace()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("codespace"));
}

#[test]
fn test_up_help_shows_all_options() {
    codespace()
        .args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--user"))
        .stdout(predicate::str::contains("--language"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_image_help_shows_subcommands() {
    codespace()
        .args(["image", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("status"));
}

// -----------------------------------------------------------------------------
// Languages
// -----------------------------------------------------------------------------

#[test]
fn test_languages_lists_supported_environments() {
    let dir = TempDir::new().unwrap();
    codespace_in(&dir)
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("javascript"))
        .stdout(predicate::str::contains("java"))
        .stdout(predicate::str::contains("cpp"))
        .stdout(predicate::str::contains("codespace-python:latest"));
}

#[test]
fn test_languages_respects_image_overrides() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("codespace.toml"),
        "[images]\npython = \"registry.lab/py:2024\"\n",
    )
    .unwrap();

    codespace_in(&dir)
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry.lab/py:2024"));
}

// -----------------------------------------------------------------------------
// Up: input validation (fails before touching the runtime)
// -----------------------------------------------------------------------------

#[test]
fn test_up_unsupported_language_fails_fast() {
    let dir = TempDir::new().unwrap();
    codespace_in(&dir)
        .args(["up", "--user", "u2", "--language", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported language: cobol"));
}

#[test]
fn test_up_requires_user_and_language() {
    codespace().arg("up").assert().failure();
    codespace().args(["up", "--user", "u1"]).assert().failure();
}

// -----------------------------------------------------------------------------
// Init
// -----------------------------------------------------------------------------

#[test]
fn test_init_writes_config() {
    let dir = TempDir::new().unwrap();
    codespace_in(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("codespace.toml"));

    let content = fs::read_to_string(dir.path().join("codespace.toml")).unwrap();
    assert!(content.contains("[sandbox]"));
    assert!(content.contains("[ports]"));
}

#[test]
fn test_init_skips_existing_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("codespace.toml"), "# mine\n").unwrap();

    codespace_in(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    // Untouched without --force.
    let content = fs::read_to_string(dir.path().join("codespace.toml")).unwrap();
    assert_eq!(content, "# mine\n");
}

#[test]
fn test_init_force_overwrites() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("codespace.toml"), "# mine\n").unwrap();

    codespace_in(&dir)
        .args(["init", "--force"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("codespace.toml")).unwrap();
    assert!(content.contains("[sandbox]"));
}

// -----------------------------------------------------------------------------
// Config validation surfaces early
// -----------------------------------------------------------------------------

#[test]
fn test_invalid_port_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("codespace.toml"),
        "[ports]\nrange_start = 50000\nrange_end = 40000\n",
    )
    .unwrap();

    codespace_in(&dir)
        .args(["up", "--user", "u1", "--language", "python"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid port range"));
}
