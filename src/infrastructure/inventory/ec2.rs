//! EC2 inventory through the `aws` CLI
//!
//! Queries `aws ec2 describe-instances` filtered on the `Project` tag and the
//! `running` state, then parses the JSON reply.

use std::collections::BTreeMap;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::domain::entities::InventoryInstance;
use crate::domain::ports::{InventoryProvider, ShellError};
use crate::error::{StagehandError, StagehandResult};
use crate::infrastructure::shell::run_with_timeout;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    instance_id: String,
    #[serde(default)]
    state: Option<Ec2State>,
    #[serde(default)]
    public_dns_name: Option<String>,
    #[serde(default)]
    tags: Vec<Ec2Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2State {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Tag {
    key: String,
    #[serde(default)]
    value: String,
}

/// Parse `describe-instances` JSON output
pub fn parse_describe_instances(json: &str) -> StagehandResult<Vec<InventoryInstance>> {
    let reply: DescribeInstances =
        serde_json::from_str(json).map_err(|e| StagehandError::ProviderUnavailable {
            message: format!("unexpected describe-instances output: {}", e),
        })?;

    Ok(reply
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .map(|i| InventoryInstance {
            instance_id: i.instance_id,
            state: i.state.map(|s| s.name).unwrap_or_default(),
            public_dns: i.public_dns_name.unwrap_or_default(),
            tags: i
                .tags
                .into_iter()
                .map(|t| (t.key, t.value))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect())
}

pub struct AwsCliInventory {
    program: String,
    region: Option<String>,
    profile: Option<String>,
    timeout: Duration,
}

impl AwsCliInventory {
    pub fn new(region: Option<String>, profile: Option<String>, timeout: Duration) -> Self {
        Self {
            program: "aws".to_string(),
            region,
            profile,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.aws.region.clone(),
            config.aws.profile.clone(),
            config.remote_timeout(),
        )
    }

    /// Use a different executable in place of `aws`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn args(&self, project: &str) -> Vec<String> {
        let mut args = vec![
            "ec2".to_string(),
            "describe-instances".to_string(),
            "--filters".to_string(),
            format!("Name=tag:Project,Values={}", project),
            "Name=instance-state-name,Values=running".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args
    }
}

impl InventoryProvider for AwsCliInventory {
    fn instances(&self, project: &str) -> StagehandResult<Vec<InventoryInstance>> {
        let args = self.args(project);
        let command_line = format!("{} {}", self.program, args.join(" "));
        tracing::debug!(command = %command_line, "querying inventory");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        let output = run_with_timeout(cmd, &command_line, None, Some(self.timeout), false).map_err(
            |e| StagehandError::ProviderUnavailable {
                message: match e {
                    ShellError::Failed { stderr, status, .. } => {
                        format!("{} exited with {}: {}", self.program, status, stderr)
                    }
                    other => other.to_string(),
                },
            },
        )?;

        parse_describe_instances(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
  "Reservations": [
    {
      "Instances": [
        {
          "InstanceId": "i-0abc",
          "State": {"Code": 16, "Name": "running"},
          "PublicDnsName": "ec2-1-2-3-4.compute.amazonaws.com",
          "Tags": [
            {"Key": "Project", "Value": "galaxy"},
            {"Key": "Stage", "Value": "staging"},
            {"Key": "Role", "Value": "app-worker"},
            {"Key": "Name", "Value": "staging app"}
          ]
        },
        {
          "InstanceId": "i-0def",
          "State": {"Code": 80, "Name": "stopped"},
          "PublicDnsName": ""
        }
      ]
    }
  ]
}"#;

    #[test]
    fn parses_instances_and_tags() {
        let instances = parse_describe_instances(REPLY).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].instance_id, "i-0abc");
        assert!(instances[0].is_running());
        assert_eq!(instances[0].tag("Role"), "app-worker");
        assert_eq!(instances[0].public_dns, "ec2-1-2-3-4.compute.amazonaws.com");
        assert!(!instances[1].is_running());
        assert!(instances[1].tags.is_empty());
    }

    #[test]
    fn empty_reply_has_no_instances() {
        assert!(parse_describe_instances("{}").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_provider_unavailable() {
        let err = parse_describe_instances("<html>").unwrap_err();
        assert!(matches!(err, StagehandError::ProviderUnavailable { .. }));
    }

    #[test]
    fn args_filter_on_project_and_region() {
        let inv = AwsCliInventory::new(
            Some("us-west-2".to_string()),
            None,
            Duration::from_secs(5),
        );
        let args = inv.args("galaxy");
        assert!(args.contains(&"Name=tag:Project,Values=galaxy".to_string()));
        assert!(args.windows(2).any(|w| w == ["--region", "us-west-2"]));
    }

    #[test]
    fn missing_cli_is_provider_unavailable() {
        let inv = AwsCliInventory::new(None, None, Duration::from_secs(5))
            .with_program("/nonexistent/aws-for-stagehand-tests");
        let err = inv.instances("galaxy").unwrap_err();
        assert!(matches!(err, StagehandError::ProviderUnavailable { .. }));
    }
}
