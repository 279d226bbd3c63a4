//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! (STRONGHABIT_ENV=dev keeps them away from real user data).

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "stronghabit-cli", "--"])
        .args(args)
        .env("STRONGHABIT_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Create an exercise and return its id.
fn create_exercise(name: &str, target: &str) -> String {
    let output = run_cli(&["exercise", "add", name, "--target", target]);
    assert_eq!(output.2, 0, "exercise add failed: {}", output.1);
    let first_line = output.0.lines().next().unwrap_or_default();
    first_line
        .strip_prefix("Exercise created: ")
        .expect("add output starts with the new id")
        .to_string()
}

#[test]
fn test_exercise_add_and_list() {
    let id = create_exercise("Push-ups", "20");

    let output = run_cli(&["exercise", "list", "--json"]);
    assert_eq!(output.2, 0, "exercise list failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("list output is JSON");
    let exercises = parsed.as_array().expect("list output is an array");
    assert!(exercises.iter().any(|e| e["id"] == id.as_str()));
}

#[test]
fn test_exercise_bump_clamps_at_zero() {
    let id = create_exercise("Squats", "15");

    let output = run_cli(&["exercise", "bump", &id, "3"]);
    assert_eq!(output.2, 0, "bump failed: {}", output.1);
    assert!(output.0.contains("\"current_reps\": 3"));

    let output = run_cli(&["exercise", "bump", &id, "-100"]);
    assert_eq!(output.2, 0, "negative bump failed: {}", output.1);
    assert!(output.0.contains("\"current_reps\": 0"));
}

#[test]
fn test_exercise_next_target_requires_completion() {
    let id = create_exercise("Plank", "5");

    // An incomplete exercise cannot take a next-day target.
    let refused = run_cli(&["exercise", "next-target", &id, "8"]);
    assert_eq!(refused.2, 1);

    let bump = run_cli(&["exercise", "bump", &id, "5"]);
    assert_eq!(bump.2, 0, "bump failed: {}", bump.1);

    let output = run_cli(&["exercise", "next-target", &id, "7"]);
    assert_eq!(output.2, 0, "next-target failed: {}", output.1);

    // A jump past 50% needs --force.
    let refused = run_cli(&["exercise", "next-target", &id, "11"]);
    assert_eq!(refused.2, 1);
    assert!(refused.1.contains("--force"));

    let forced = run_cli(&["exercise", "next-target", &id, "11", "--force"]);
    assert_eq!(forced.2, 0, "forced next-target failed: {}", forced.1);
}

#[test]
fn test_exercise_delete() {
    let id = create_exercise("Burpees", "12");
    let output = run_cli(&["exercise", "delete", &id]);
    assert_eq!(output.2, 0, "delete failed: {}", output.1);

    let list = run_cli(&["exercise", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&list.0).expect("list output is JSON");
    let exercises = parsed.as_array().expect("list output is an array");
    assert!(!exercises.iter().any(|e| e["id"] == id.as_str()));
}

#[test]
fn test_bump_unknown_exercise_fails() {
    let output = run_cli(&["exercise", "bump", "no-such-id", "1"]);
    assert_eq!(output.2, 1);
    assert!(output.1.contains("error:"));
}

#[test]
fn test_stats_show() {
    let output = run_cli(&["stats", "show"]);
    assert_eq!(output.2, 0, "stats show failed: {}", output.1);
    assert!(output.0.contains("streak:"));

    let output = run_cli(&["stats", "show", "--json"]);
    assert_eq!(output.2, 0, "stats show --json failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("stats output is JSON");
    assert!(parsed["streak"].is_number());
}

#[test]
fn test_cycle_check() {
    let output = run_cli(&["cycle", "check", "--json"]);
    assert_eq!(output.2, 0, "cycle check failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("events output is JSON");
    assert!(parsed.as_array().is_some());
}

#[test]
fn test_config_get() {
    let output = run_cli(&["config", "get", "reminders.start_hour"]);
    assert_eq!(output.2, 0, "config get failed: {}", output.1);
}

#[test]
fn test_config_get_unknown_key() {
    let output = run_cli(&["config", "get", "no.such.key"]);
    assert_eq!(output.2, 1);
}

#[test]
fn test_config_set_and_get() {
    let output = run_cli(&["config", "set", "cycle.check_interval_secs", "60"]);
    assert_eq!(output.2, 0, "config set failed: {}", output.1);
    assert!(output.0.contains("ok"));

    let output = run_cli(&["config", "get", "cycle.check_interval_secs"]);
    assert_eq!(output.2, 0);
    assert_eq!(output.0.trim(), "60");
}

#[test]
fn test_config_list() {
    let output = run_cli(&["config", "list"]);
    assert_eq!(output.2, 0, "config list failed: {}", output.1);
    let parsed: serde_json::Value = serde_json::from_str(&output.0).expect("config list is JSON");
    assert!(parsed["reminders"]["max_interval_mins"].is_number());
}

#[test]
fn test_config_path() {
    let output = run_cli(&["config", "path"]);
    assert_eq!(output.2, 0, "config path failed: {}", output.1);
    assert!(output.0.contains("config.toml"));
}

#[test]
fn test_completions_bash() {
    let output = run_cli(&["completions", "bash"]);
    assert_eq!(output.2, 0, "completions failed: {}", output.1);
    assert!(output.0.contains("stronghabit"));
}
