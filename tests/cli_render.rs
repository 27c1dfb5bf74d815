mod common;

use common::*;
use serde_json::Value;

fn render_env() -> TestEnv {
    let env = TestEnv::new();
    env.write_file("deploy/task-definition.json", TASK_TEMPLATE);
    env.write_file("deploy/environments/staging.yml", STAGING_ENVIRONMENT);
    env
}

#[test]
fn render_writes_task_definition_to_stdout() {
    let env = render_env();
    let result = env.run(&["render", "staging", "abc123"]);
    assert!(result.is_success(), "stderr: {}", result.stderr);

    let doc: Value = serde_json::from_str(&result.stdout).unwrap();
    assert_eq!(doc["family"], "galaxy-staging");
    assert_eq!(doc["cpu"], "256");
    assert_eq!(doc["memory"], "512");

    let container = &doc["containerDefinitions"][0];
    assert_eq!(
        container["image"],
        "123.dkr.ecr.us-west-2.amazonaws.com/galaxy:abc123"
    );
    assert_eq!(
        container["environment"],
        serde_json::json!([
            {"name": "FOO", "value": "bar"},
            {"name": "REVISION", "value": "abc123"}
        ])
    );
    assert_eq!(
        container["secrets"],
        serde_json::json!([{
            "name": "API_KEY",
            "valueFrom": "arn:aws:ssm:us-west-2:123456789012:parameter/path/to/key"
        }])
    );
    assert_eq!(doc["tags"], serde_json::json!([{"key": "team", "value": "platform"}]));
}

#[test]
fn render_integer_resources_only_for_literal_true() {
    let env = render_env();

    let ints = env.run(&["render", "staging", "abc123", "true"]);
    assert!(ints.is_success(), "stderr: {}", ints.stderr);
    let doc: Value = serde_json::from_str(&ints.stdout).unwrap();
    assert_eq!(doc["cpu"], 256);
    assert_eq!(doc["memory"], 512);

    let strings = env.run(&["render", "staging", "abc123", "yes"]);
    assert!(strings.is_success(), "stderr: {}", strings.stderr);
    let doc: Value = serde_json::from_str(&strings.stdout).unwrap();
    assert_eq!(doc["cpu"], "256");
}

#[test]
fn render_missing_environment_fails() {
    let env = render_env();
    let result = env.run(&["render", "qa", "abc123"]);
    assert!(!result.is_success());
    assert!(result.stdout.is_empty());
    assert_output_contains!(result, "configuration not found");
    assert_output_contains!(result, "qa.yml");
}

#[test]
fn render_malformed_yaml_reports_parse_error() {
    let env = render_env();
    env.write_file("deploy/environments/broken.yml", "environment:\n  FOO: [unclosed\n");
    let result = env.run(&["render", "broken", "abc123"]);
    assert!(!result.is_success());
    assert_output_contains!(result, "parse error");
}
