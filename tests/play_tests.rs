//! Scripted session and leaderboard tests

mod common;

use common::{Sandbox, FULL_ROUND_SCRIPT};
use predicates::prelude::*;
use std::fs;

// ============================================================================
// Play Tests
// ============================================================================

#[test]
fn test_play_full_round_saves_score() {
    let sb = Sandbox::new();
    let script = sb.write("round.yaml", FULL_ROUND_SCRIPT);

    sb.mq()
        .arg("play")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("player Ana"))
        .stdout(predicate::str::contains("Score: 80"))
        .stdout(predicate::str::contains("answered 4/4"))
        .stdout(predicate::str::contains("Score saved"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sb.scores_path()).unwrap()).unwrap();
    let records = saved.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["score"], 80);
    assert_eq!(records[0]["label"], "measurement");
    assert_eq!(records[0]["playerName"], "Ana");
}

#[test]
fn test_play_dry_run_does_not_save() {
    let sb = Sandbox::new();
    let script = sb.write("round.yaml", FULL_ROUND_SCRIPT);

    sb.mq()
        .args(["play", "--dry-run"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 80"))
        .stdout(predicate::str::contains("dry run"));

    assert!(!sb.scores_path().exists());
}

#[test]
fn test_play_player_flag_overrides_script() {
    let sb = Sandbox::new();
    let script = sb.write("round.yaml", FULL_ROUND_SCRIPT);

    sb.mq()
        .args(["play", "--player", "Bea"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("player Bea"));

    let saved = fs::read_to_string(sb.scores_path()).unwrap();
    assert!(saved.contains("Bea"));
    assert!(!saved.contains("Ana"));
}

#[test]
fn test_play_wrong_answer_keeps_question() {
    let sb = Sandbox::new();
    let script = sb.write(
        "miss.yaml",
        r#"steps:
  - start_camera
  - detect: marker
  - tap: [0, 0]
  - tap: [21, 0]
  - calibrate
  - tap: [0, 0]
  - tap: [900, 0]
  - submit
"#,
    );

    sb.mq()
        .args(["play"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("try again"))
        .stdout(predicate::str::contains("Score: 0"))
        .stdout(predicate::str::contains("answered 0/4"));

    assert!(!sb.scores_path().exists());
}

#[test]
fn test_play_tap_before_camera_is_ignored() {
    let sb = Sandbox::new();
    let script = sb.write(
        "early.yaml",
        r#"steps:
  - tap: [1, 1]
  - start_camera
"#,
    );

    sb.mq()
        .args(["play"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored"))
        .stdout(predicate::str::contains("mode awaiting-calibration"));
}

#[test]
fn test_play_unavailable_camera_reports_error() {
    let sb = Sandbox::new();
    let script = sb.write(
        "denied.yaml",
        r#"camera_unavailable: permission denied
steps:
  - start_camera
"#,
    );

    sb.mq()
        .args(["play"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Camera unavailable"))
        .stdout(predicate::str::contains("mode idle"));
}

#[test]
fn test_play_json_report() {
    let sb = Sandbox::new();
    let script = sb.write("round.yaml", FULL_ROUND_SCRIPT);

    let output = sb
        .mq()
        .args(["-o", "json", "play", "--dry-run"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["player"], "Ana");
    assert_eq!(report["summary"]["score"], 80);
    assert_eq!(report["summary"]["completed"], true);
    let steps = report["steps"].as_array().unwrap();
    assert!(steps.iter().all(|s| s.get("error").is_none()));
    assert_eq!(steps[0]["outcome"]["event"], "camera_started");
}

#[test]
fn test_play_invalid_script_fails() {
    let sb = Sandbox::new();
    let script = sb.write("broken.yaml", "steps:\n  - jump\n");

    sb.mq()
        .args(["play"])
        .arg(&script)
        .assert()
        .failure();
}

#[test]
fn test_play_missing_script_fails() {
    let sb = Sandbox::new();
    sb.mq()
        .args(["play", "nowhere.yaml"])
        .assert()
        .failure();
}

// ============================================================================
// Scores Tests
// ============================================================================

#[test]
fn test_scores_list_empty() {
    let sb = Sandbox::new();
    sb.mq()
        .args(["scores", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scores recorded yet."));
}

#[test]
fn test_scores_list_sorted() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(40, "Low"), (80, "High"), (60, "Mid")]);

    let output = sb
        .mq()
        .args(["-o", "text", "scores", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("1\tHigh\t80"));
    assert!(lines[2].starts_with("3\tLow\t40"));
}

#[test]
fn test_scores_list_limit() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(40, "Low"), (80, "High"), (60, "Mid")]);

    sb.mq()
        .args(["-o", "text", "scores", "list", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("High"))
        .stdout(predicate::str::contains("Mid").not());
}

#[test]
fn test_scores_total() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(40, "Low"), (80, "High")]);

    sb.mq()
        .args(["scores", "total"])
        .assert()
        .success()
        .stdout(predicate::str::diff("120\n"));
}

#[test]
fn test_scores_clear_requires_confirmation() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(40, "Low")]);

    sb.mq()
        .args(["scores", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert!(sb.scores_path().exists());
}

#[test]
fn test_scores_clear_with_yes() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(40, "Low"), (80, "High")]);

    sb.mq()
        .args(["scores", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 score(s)"));

    sb.mq()
        .args(["scores", "total"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0\n"));
}

#[test]
fn test_scores_corrupt_file_fails() {
    let sb = Sandbox::new();
    fs::write(sb.scores_path(), "not json").unwrap();

    sb.mq()
        .args(["scores", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}

#[test]
fn test_play_appends_to_existing_scores() {
    let sb = Sandbox::new();
    sb.seed_scores(&[(20, "Earlier")]);
    let script = sb.write("round.yaml", FULL_ROUND_SCRIPT);

    sb.mq().arg("play").arg(&script).assert().success();

    sb.mq()
        .args(["scores", "total"])
        .assert()
        .success()
        .stdout(predicate::str::diff("100\n"));
}
