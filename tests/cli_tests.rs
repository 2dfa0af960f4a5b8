use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn starfield_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("starfield").unwrap();
    // keep a developer's .env out of the picture
    cmd.current_dir(dir.path())
        .env_remove("NYT_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("latest"))
        .stdout(predicate::str::contains("trending"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("check-key"));
}

#[test]
fn test_search_help_shows_options() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sort"))
        .stdout(predicate::str::contains("--begin-date"))
        .stdout(predicate::str::contains("--end-date"))
        .stdout(predicate::str::contains("--page"));
}

#[test]
fn test_trending_rejects_unknown_period() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .args(["trending", "--period", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 1, 7 or 30"));
}

#[test]
fn test_latest_reports_unreachable_api() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .arg("latest")
        .env("NYT_API_KEY", "test-key")
        .env("NYT_BASE_URL", "http://127.0.0.1:1")
        .env("STARFIELD_TIMEOUT_SECS", "2")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No response from NYT servers"));
}

#[test]
fn test_invalid_poll_interval_is_config_error() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .arg("latest")
        .env("STARFIELD_POLL_SECS", "soon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_check_key_requires_key() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .arg("check-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NYT_API_KEY is not set"));
}

#[test]
fn test_empty_search_query_is_rejected() {
    let dir = TempDir::new().unwrap();

    starfield_cmd(&dir)
        .args(["search", "  "])
        .env("NYT_BASE_URL", "http://127.0.0.1:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search query is empty"));
}
