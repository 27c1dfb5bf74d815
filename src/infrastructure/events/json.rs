//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON form of a deploy event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started {
            stage,
            hosts,
            parallel,
        } => serde_json::json!({
            "event": "start",
            "command": "deploy",
            "stage": stage,
            "hosts": hosts,
            "parallel": parallel,
        }),

        DeployEvent::StepStarted { host, step } => serde_json::json!({
            "event": "step_start",
            "command": "deploy",
            "host": host,
            "step": step.as_str(),
        }),

        DeployEvent::StepCompleted { host, step } => serde_json::json!({
            "event": "step_complete",
            "command": "deploy",
            "host": host,
            "step": step.as_str(),
        }),

        DeployEvent::StepSkipped { host, step, reason } => serde_json::json!({
            "event": "step_skipped",
            "command": "deploy",
            "host": host,
            "step": step.as_str(),
            "reason": reason,
        }),

        DeployEvent::ReleaseCreated { host, release } => serde_json::json!({
            "event": "release_created",
            "command": "deploy",
            "host": host,
            "release": release.as_str(),
        }),

        DeployEvent::PruneWarning {
            host,
            release,
            error,
        } => serde_json::json!({
            "event": "prune_warning",
            "command": "deploy",
            "host": host,
            "release": release.as_str(),
            "error": error,
        }),

        DeployEvent::HostSucceeded { host, release } => serde_json::json!({
            "event": "host_complete",
            "command": "deploy",
            "host": host,
            "release": release.as_str(),
        }),

        DeployEvent::HostFailed { host, step, error } => serde_json::json!({
            "event": "host_error",
            "command": "deploy",
            "host": host,
            "step": step.as_str(),
            "error": error,
        }),

        DeployEvent::Completed { succeeded, failed } => serde_json::json!({
            "event": "complete",
            "command": "deploy",
            "succeeded": succeeded,
            "failed": failed,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }
}
