//! End-to-end tests of the `skillpass` binary that need no network.

use assert_cmd::Command;
use predicates::prelude::*;

fn skillpass() -> Command {
    Command::cargo_bin("skillpass").unwrap()
}

#[test]
fn link_prints_verification_url() {
    skillpass()
        .args(["link", "https://skillpass.app/", "0xABC"])
        .assert()
        .success()
        .stdout("https://skillpass.app/verify/0xabc\n");
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skillpass.toml");
    std::fs::write(&path, "event_query_limit = 0\n").unwrap();

    skillpass()
        .args(["--config", path.to_str().unwrap(), "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn missing_subcommand_shows_usage() {
    skillpass()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
