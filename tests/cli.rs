use assert_cmd::Command;
use predicates::prelude::*;

fn ytscribe() -> Command {
    Command::cargo_bin("ytscribe").unwrap()
}

#[test]
fn test_help_lists_commands() {
    ytscribe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("video"))
        .stdout(predicate::str::contains("channel"))
        .stdout(predicate::str::contains("playlist"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_channel_help_describes_period_grammar() {
    ytscribe()
        .args(["channel", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--period"))
        .stdout(predicate::str::contains("b-MM/DD/YYYY"))
        .stdout(predicate::str::contains("--include-shorts"));
}

#[test]
fn test_invalid_period_fails_before_any_work() {
    ytscribe()
        .args(["channel", "UC123", "--period", "last-year"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period: last-year"));
}

#[test]
fn test_reversed_range_is_rejected() {
    ytscribe()
        .args(["playlist", "https://www.youtube.com/playlist?list=PL1", "-p", "12/31/2023-01/01/2023"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period"));
}

#[test]
fn test_conflicting_destinations() {
    ytscribe()
        .args([
            "video",
            "dQw4w9WgXcQ",
            "--google-doc",
            "https://docs.google.com/document/d/abc/edit",
            "--word-dir",
            ".",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_version() {
    ytscribe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
