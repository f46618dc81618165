//! The compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn relicta_action() -> Command {
    let mut cmd = Command::cargo_bin("relicta-action").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("INPUT_GITHUB-TOKEN")
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITHUB_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_token_fails_before_any_work() {
    let temp = TempDir::new().unwrap();

    relicta_action()
        .current_dir(temp.path())
        .env("RUNNER_TOOL_CACHE", temp.path().join("cache"))
        .env("RUNNER_TEMP", temp.path().join("tmp"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GitHub token is required"))
        .stderr(predicate::str::contains("GITHUB_TOKEN"));

    assert!(!temp.path().join("cache").exists());
    assert!(!temp.path().join("tmp").exists());
}

#[test]
fn test_missing_token_is_annotated_inside_actions() {
    relicta_action()
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::GitHub token is required"));
}

#[test]
fn test_invalid_boolean_input() {
    relicta_action()
        .env("INPUT_GITHUB-TOKEN", "ghp_test")
        .env("INPUT_DRY-RUN", "sometimes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dry-run"));
}

#[test]
fn test_help() {
    relicta_action()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tool-version"))
        .stdout(predicate::str::contains("--plugins"));
}
