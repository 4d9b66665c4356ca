//! End-to-end CLI tests for the fetcher binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary command isolated from the user's config and data directories.
fn fetcher_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fetcher").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch a document and open it"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetcher"));
}

#[test]
fn test_binary_missing_url_returns_error() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .args(["--invalid-flag", "https://example.com/a.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_out_of_range_retries_rejected() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .args(["-r", "11", "https://example.com/a.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("11"));
}

#[test]
fn test_binary_empty_url_is_invalid_link() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .arg("")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid link"));
}

#[test]
fn test_binary_non_http_scheme_is_invalid_link() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .args(["-q", "file:///etc/passwd"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid link"));
}

#[test]
fn test_binary_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("absent.toml");
    fetcher_cmd(&home)
        .arg("--config")
        .arg(&missing)
        .arg("https://example.com/a.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_binary_unknown_config_key_fails() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("fetcher");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "concurrency = 4\n").unwrap();

    fetcher_cmd(&home)
        .arg("https://example.com/a.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_binary_logs_go_to_stderr() {
    let home = TempDir::new().unwrap();
    fetcher_cmd(&home)
        .args(["-v", ""])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid link"))
        .stdout(predicate::str::contains("DEBUG").not())
        .stderr(predicate::str::contains("rejecting invalid URL"));
}
