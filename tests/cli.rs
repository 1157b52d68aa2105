// ABOUTME: Integration tests for the dockhand binary.
// ABOUTME: Covers help/version, argument errors, config errors and the missing-tool exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn dockhand_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dockhand"))
}

#[test]
fn help_shows_flags_and_exits_zero() {
    let temp_dir = tempfile::tempdir().unwrap();
    dockhand_cmd()
        .current_dir(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cleanup"))
        .stdout(predicate::str::contains("--config"));

    // No side effects: not even a log file.
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn version_exits_zero() {
    dockhand_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_prints_usage_and_fails() {
    dockhand_cmd()
        .arg("--frobnicate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_local_tool_exits_20_before_prompting() {
    let temp_dir = tempfile::tempdir().unwrap();

    let assert = dockhand_cmd()
        .current_dir(temp_dir.path())
        .env("PATH", "")
        .env_remove("DOCKHAND_TOKEN")
        .env_remove("RUST_LOG")
        .write_stdin("")
        .assert()
        .code(20)
        .stdout(predicate::str::contains("Repository URL").not())
        .stderr(predicate::str::contains("git"))
        .stderr(predicate::str::contains("rsync"));

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(
        stderr.matches("required tools not found").count(),
        1,
        "error printed once: {stderr}"
    );

    let logs: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("dockhand_") && name.ends_with(".log"))
        .collect();
    assert_eq!(logs.len(), 1, "one log file per invocation");

    let content = fs::read_to_string(temp_dir.path().join(&logs[0])).unwrap();
    assert!(content.contains("required tools not found"));
}

#[test]
fn invalid_config_exits_one() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("dockhand.yml"), "bogus_key: 1\n").unwrap();

    dockhand_cmd()
        .current_dir(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dockhand.yml"));
}

#[test]
fn explicit_missing_config_exits_one() {
    dockhand_cmd()
        .args(["--config", "/nonexistent/dockhand.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn json_mode_reports_errors_as_json() {
    let temp_dir = tempfile::tempdir().unwrap();

    dockhand_cmd()
        .current_dir(temp_dir.path())
        .env("PATH", "")
        .arg("--json")
        .write_stdin("")
        .assert()
        .code(20)
        .stderr(predicate::str::contains(r#""event":"error""#));
}
