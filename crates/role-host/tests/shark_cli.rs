//! Integration tests for the `shark-cli` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_installation_arguments() {
    let mut command = cargo_bin_cmd!("shark-cli");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("SHARK_ROOT"))
        .stdout(contains("--metastore-uris"));
}

#[test]
fn missing_arguments_exit_with_failure() {
    let mut command = cargo_bin_cmd!("shark-cli");
    command.arg("/opt/shark");
    command.assert().failure().stderr(contains("JAVA_HOME"));
}

#[test]
fn missing_installation_exits_with_failure() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut command = cargo_bin_cmd!("shark-cli");
    command
        .arg(root.path().join("shark"))
        .arg(root.path().join("spark"))
        .arg(root.path().join("java"));
    command.assert().failure();
}
