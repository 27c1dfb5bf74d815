mod common;

use common::*;
use serde_json::Value;

fn hosts_env() -> TestEnv {
    let env = TestEnv::new();
    env.write_file("deploy/hosts.txt", HOSTS_FILE);
    env
}

#[test]
fn hosts_list_prints_persisted_inventory() {
    let env = hosts_env();
    let result = env.run(&["hosts", "list"]);
    assert!(result.is_success(), "stderr: {}", result.stderr);

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert!(lines[0].starts_with("Instance"));
    assert_eq!(lines[1], "-".repeat(80));
    // one row per instance, roles folded back together
    assert_eq!(lines.len(), 5);
    assert!(lines[2].contains("app-worker"));
    assert!(lines[2].contains("app-1.example.com"));
}

#[test]
fn hosts_list_filters_by_stage_and_role() {
    let env = hosts_env();
    let result = env.run(&["hosts", "list", "--stage", "production", "--role", "worker", "--json"]);
    assert!(result.is_success(), "stderr: {}", result.stderr);

    let rows: Value = serde_json::from_str(&result.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["instance_id"], "i-0a1");
    assert_eq!(rows[0]["role"], "worker");
    assert_eq!(rows[0]["name"], "galaxy-production-app");
}

#[test]
fn hosts_list_without_file_is_empty() {
    let env = TestEnv::new();
    let result = env.run(&["hosts", "list", "--json"]);
    assert!(result.is_success(), "stderr: {}", result.stderr);
    assert_eq!(result.stdout.trim(), "[]");
}

#[test]
fn hosts_list_reports_malformed_row_with_line_number() {
    let env = TestEnv::new();
    env.write_file(
        "deploy/hosts.txt",
        "Instance Stage Role Host Name\n----\ni-1 staging app\n",
    );
    let result = env.run(&["hosts", "list"]);
    assert!(!result.is_success());
    assert_output_contains!(result, ":3");
    assert_output_contains!(result, "expected 4 or 5 columns, found 3");
}

#[test]
fn hosts_file_location_follows_env_override() {
    let env = TestEnv::new();
    env.write_file("inventory/fleet.txt", HOSTS_FILE);
    let result = env.run_with_env(
        &["hosts", "list", "--stage", "staging", "--json"],
        &[("STAGEHAND_HOSTS_FILE", "inventory/fleet.txt")],
    );
    assert!(result.is_success(), "stderr: {}", result.stderr);

    let rows: Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["host"], "stage-1.example.com");
}
