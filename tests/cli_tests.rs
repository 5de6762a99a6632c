//! CLI integration tests using assert_cmd.
//!
//! None of these need a database or a running server.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn levelup() -> Command {
    let mut cmd = Command::cargo_bin("levelup").unwrap();
    cmd.env_remove("DATABASE_URL")
        .env_remove("LEVELUP_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

// --- Help and arg validation ---

#[test]
fn help_shows_all_subcommands() {
    levelup().arg("--help").assert().success().stdout(
        predicate::str::contains("serve")
            .and(predicate::str::contains("prune"))
            .and(predicate::str::contains("stats"))
            .and(predicate::str::contains("xp"))
            .and(predicate::str::contains("objectives"))
            .and(predicate::str::contains("add"))
            .and(predicate::str::contains("toggle"))
            .and(predicate::str::contains("pomodoro")),
    );
}

#[test]
fn help_serve_shows_args() {
    levelup()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--port")
                .and(predicate::str::contains("--static-dir"))
                .and(predicate::str::contains("--prune-interval-secs")),
        );
}

#[test]
fn serve_requires_database_url() {
    levelup()
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL is required"));
}

#[test]
fn prune_requires_database_url() {
    levelup()
        .arg("prune")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL is required"));
}

#[test]
fn xp_rejects_unknown_category() {
    levelup()
        .args(["xp", "strength", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn xp_rejects_non_integer_delta() {
    levelup()
        .args(["xp", "health", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn toggle_rejects_non_integer_id() {
    levelup()
        .args(["toggle", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn add_requires_text() {
    levelup().arg("add").assert().failure();
}

// --- Front-end commands without a server ---

#[test]
fn stats_reports_unreachable_server() {
    levelup()
        .args(["--api-url", "http://127.0.0.1:9", "stats"])
        .assert()
        .failure();
}

#[test]
fn negative_xp_delta_parses_before_connecting() {
    // Parsing succeeds (no clap usage error); the failure comes from the network
    levelup()
        .args(["--api-url", "http://127.0.0.1:9", "xp", "deen", "-20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage").not());
}

// --- Pomodoro ---

#[test]
fn pomodoro_quits_on_q() {
    levelup()
        .arg("pomodoro")
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("25:00"));
}
