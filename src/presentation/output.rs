//! Output Rendering
//!
//! Text and JSON forms of command results. Renderers return strings; the
//! binary decides where they go.

use serde_json::{json, Value};

use crate::application::{DeployReport, PruneReport};
use crate::domain::entities::{HostRecord, HostSet};
use crate::domain::services::format_host_table;
use crate::domain::value_objects::ReleaseId;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Selected records, in the same tabular form as the hosts file.
pub fn render_hosts(records: &[HostRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let set: HostSet = records.iter().cloned().collect();
            format_host_table(&set)
        }
        OutputFormat::Json => {
            let rows: Vec<Value> = records
                .iter()
                .map(|r| {
                    json!({
                        "instance_id": r.instance_id,
                        "stage": r.stage,
                        "role": r.role,
                        "host": r.host,
                        "name": r.name,
                    })
                })
                .collect();
            format!("{}\n", Value::Array(rows))
        }
    }
}

/// Releases on one host, oldest first; the live one is starred.
pub fn render_releases(
    host: &str,
    releases: &[ReleaseId],
    current: Option<&ReleaseId>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = format!("{}\n", host);
            if releases.is_empty() {
                out.push_str("  (no releases)\n");
            }
            for release in releases {
                let marker = if Some(release) == current { "*" } else { " " };
                out.push_str(&format!("  {} {}\n", marker, release));
            }
            out
        }
        OutputFormat::Json => {
            let value = json!({
                "host": host,
                "releases": releases.iter().map(ReleaseId::as_str).collect::<Vec<_>>(),
                "current": current.map(ReleaseId::as_str),
            });
            format!("{}\n", value)
        }
    }
}

pub fn render_prune(host: &str, report: &PruneReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = format!(
                "{}: kept {}, removed {}\n",
                host,
                report.kept.len(),
                report.removed.len()
            );
            for release in &report.removed {
                out.push_str(&format!("  - {}\n", release));
            }
            if let Some(protected) = &report.protected {
                out.push_str(&format!("  ! {} is live, left in place\n", protected));
            }
            for (release, error) in &report.failed {
                out.push_str(&format!("  ! {} could not be removed: {}\n", release, error));
            }
            out
        }
        OutputFormat::Json => {
            let value = json!({
                "host": host,
                "kept": report.kept.iter().map(ReleaseId::as_str).collect::<Vec<_>>(),
                "removed": report.removed.iter().map(ReleaseId::as_str).collect::<Vec<_>>(),
                "protected": report.protected.as_ref().map(ReleaseId::as_str),
                "failed": report
                    .failed
                    .iter()
                    .map(|(id, err)| json!({ "release": id.as_str(), "error": err }))
                    .collect::<Vec<_>>(),
            });
            format!("{}\n", value)
        }
    }
}

/// Closing summary of a deploy run (text only; `--json` runs stream events).
pub fn render_deploy_summary(stage: &str, report: &DeployReport) -> String {
    let mut out = String::new();
    if report.is_success() {
        out.push_str(&format!(
            "Deployed {} to {} host(s)\n",
            stage,
            report.succeeded()
        ));
    } else {
        out.push_str(&format!(
            "Deploy to {} failed: {} succeeded, {} failed, {} not attempted\n",
            stage,
            report.succeeded(),
            report.failed(),
            report.not_attempted.len()
        ));
    }
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(release) => out.push_str(&format!("  ok     {}  {}\n", outcome.host, release)),
            Err(err) => out.push_str(&format!("  FAILED {}  {}\n", outcome.host, err)),
        }
    }
    for host in &report.not_attempted {
        out.push_str(&format!("  skip   {}\n", host));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::HostOutcome;
    use crate::domain::value_objects::PipelineStage;
    use crate::error::StagehandError;

    fn id(s: &str) -> ReleaseId {
        ReleaseId::parse(s).unwrap()
    }

    #[test]
    fn releases_text_marks_current() {
        let releases = vec![id("20240501120000"), id("20240502120000")];
        let out = render_releases(
            "app-1.example.com",
            &releases,
            Some(&releases[1]),
            OutputFormat::Text,
        );
        assert_eq!(
            out,
            "app-1.example.com\n    20240501120000\n  * 20240502120000\n"
        );
    }

    #[test]
    fn releases_json_has_current() {
        let releases = vec![id("20240501120000")];
        let out = render_releases("h", &releases, None, OutputFormat::Json);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["releases"][0], "20240501120000");
        assert!(value["current"].is_null());
    }

    #[test]
    fn hosts_json_is_an_array_of_records() {
        let records = vec![HostRecord::new("i-1", "staging", "app", "i-1.example.com")];
        let out = render_hosts(&records, OutputFormat::Json);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["role"], "app");
        assert_eq!(value[0]["host"], "i-1.example.com");
    }

    #[test]
    fn prune_text_reports_protected_and_failures() {
        let report = PruneReport {
            kept: vec![id("20240505000000")],
            removed: vec![id("20240501000000")],
            protected: Some(id("20240502000000")),
            failed: vec![(id("20240503000000"), "permission denied".to_string())],
        };
        let out = render_prune("h", &report, OutputFormat::Text);
        assert!(out.starts_with("h: kept 1, removed 1\n"));
        assert!(out.contains("20240502000000 is live"));
        assert!(out.contains("permission denied"));
    }

    #[test]
    fn deploy_summary_lists_failures_and_skips() {
        let report = DeployReport {
            outcomes: vec![
                HostOutcome {
                    host: "a".to_string(),
                    result: Ok(id("20240501120000")),
                },
                HostOutcome {
                    host: "b".to_string(),
                    result: Err(StagehandError::Cancelled {
                        stage: PipelineStage::Built,
                    }),
                },
            ],
            not_attempted: vec!["c".to_string()],
        };
        let out = render_deploy_summary("staging", &report);
        assert!(out.starts_with("Deploy to staging failed: 1 succeeded, 1 failed, 1 not attempted"));
        assert!(out.contains("  FAILED b"));
        assert!(out.contains("  skip   c"));
    }
}
