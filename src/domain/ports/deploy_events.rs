//! Deploy Event Port
//!
//! Provides an observable interface for deploy runs.
//! Enables progress logging and JSON event streams.

use crate::domain::value_objects::{PipelineStage, ReleaseId};

/// Event emitted during a deploy run
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Run started
    Started {
        stage: String,
        hosts: Vec<String>,
        parallel: bool,
    },

    /// A step started on a host
    StepStarted { host: String, step: PipelineStage },

    /// A step finished on a host
    StepCompleted { host: String, step: PipelineStage },

    /// A step was skipped on a host (e.g. no app role for restart)
    StepSkipped {
        host: String,
        step: PipelineStage,
        reason: String,
    },

    /// Release id chosen for a host
    ReleaseCreated { host: String, release: ReleaseId },

    /// An old release could not be deleted (not fatal)
    PruneWarning {
        host: String,
        release: ReleaseId,
        error: String,
    },

    /// Host finished the whole pipeline
    HostSucceeded { host: String, release: ReleaseId },

    /// Host stopped early
    HostFailed {
        host: String,
        step: PipelineStage,
        error: String,
    },

    /// Run finished
    Completed { succeeded: usize, failed: usize },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - LogEventSink: `tracing` lines for humans
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
