
use predicates::prelude::*;
use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;
use test_helpers::base_moodtrail_command;

fn write_entry(db: &Path, args: &[&str], stdin: &str) -> assert_cmd::assert::Assert {
    let mut cmd = base_moodtrail_command();
    cmd.arg("--db").arg(db).arg("write").args(args).write_stdin(stdin);
    cmd.assert()
}

#[test]
fn test_cli_help_lists_commands() {
    base_moodtrail_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("write")
                .and(predicate::str::contains("history"))
                .and(predicate::str::contains("trend"))
                .and(predicate::str::contains("calendar")),
        );
}

#[test]
fn test_cli_requires_a_command() {
    base_moodtrail_command().assert().failure();
}

#[test]
fn test_cli_rejects_unknown_mood() {
    base_moodtrail_command()
        .args(["--ephemeral", "write", "--mood", "grumpy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mood"));
}

#[test]
fn test_cli_ephemeral_history_is_empty() {
    base_moodtrail_command()
        .args(["--ephemeral", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
#[serial]
fn test_cli_write_saves_entry_and_shows_guidance() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("moods.db");

    write_entry(&db, &["--mood", "anxious"], "Big presentation today.\n")
        .success()
        .stdout(
            predicate::str::contains("acknowledge your anxious feelings")
                .and(predicate::str::contains("Saved entry")),
        );

    base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .arg("history")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("anxious")
                .and(predicate::str::contains("Big presentation today.")),
        );
}

#[test]
#[serial]
fn test_cli_write_with_empty_input_saves_nothing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("moods.db");

    write_entry(&db, &["--mood", "calm"], "")
        .success()
        .stdout(predicate::str::contains("no entry saved"));

    base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .arg("trend")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
#[serial]
fn test_cli_mood_after_needs_enough_text() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("moods.db");

    write_entry(&db, &["--mood", "sad", "--after", "calm"], "short\n")
        .success()
        .stderr(predicate::str::contains("Write more than 50 characters"));

    let output = base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .args(["history", "--json"])
        .output()
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["mood_before"], "sad");
    assert!(rows[0]["outcome"].is_null());
}

#[test]
#[serial]
fn test_cli_history_json_reports_outcome_moods() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("moods.db");

    write_entry(
        &db,
        &["--mood", "sad", "--after", "calm"],
        "Spent the morning stuck on a bug.\nWent for a walk and it finally made sense.\n",
    )
    .success();
    write_entry(&db, &["--mood", "happy"], "Shipped it.\n").success();

    let output = base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .args(["history", "--json", "--sort", "created", "--asc"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["mood_before"], "sad");
    assert_eq!(rows[0]["outcome"], "happy");
    assert_eq!(rows[1]["mood_before"], "happy");
    assert!(rows[1]["outcome"].is_null());

    base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .arg("trend")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Calm")
                .and(predicate::str::contains("Happy"))
                .and(predicate::str::contains("Average: 4.5 over 2 entries")),
        );

    base_moodtrail_command()
        .arg("--db")
        .arg(&db)
        .arg("calendar")
        .assert()
        .success()
        .stdout(predicate::str::contains("happy").and(predicate::str::contains("entries")));
}

#[test]
fn test_cli_calendar_rejects_bad_month() {
    base_moodtrail_command()
        .args(["--ephemeral", "calendar", "--month", "March"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM"));
}

#[test]
fn test_cli_reports_bad_autosave_interval() {
    base_moodtrail_command()
        .env("MOODTRAIL_AUTOSAVE_MS", "soon")
        .args(["--ephemeral", "trend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MOODTRAIL_AUTOSAVE_MS"));
}

#[test]
fn test_cli_json_logs_go_to_stderr() {
    base_moodtrail_command()
        .args(["--log-format", "json", "--ephemeral", "trend"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."))
        .stdout(predicate::str::contains("\"level\"").not())
        .stderr(predicate::str::contains("\"level\""));
}
