//! Release Results
//!
//! Reports returned by release operations and deploy runs.

use crate::domain::value_objects::{PipelineStage, ReleaseId};
use crate::error::StagehandError;

/// Outcome of pruning one host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub kept: Vec<ReleaseId>,
    pub removed: Vec<ReleaseId>,
    /// Outside the window but live, so left in place
    pub protected: Option<ReleaseId>,
    /// Deletions that failed, with the error text
    pub failed: Vec<(ReleaseId, String)>,
}

/// Which migration steps ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub schema: bool,
    pub data: bool,
}

/// One host's result within a deploy run
#[derive(Debug)]
pub struct HostOutcome {
    pub host: String,
    pub result: Result<ReleaseId, StagehandError>,
}

impl HostOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Stage the host stopped at, if it failed
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        self.result.as_ref().err().and_then(StagehandError::stage)
    }
}

/// Result of a deploy run across hosts
#[derive(Debug, Default)]
pub struct DeployReport {
    pub outcomes: Vec<HostOutcome>,
    /// Hosts never started because an earlier host failed or the run was cancelled
    pub not_attempted: Vec<String>,
}

impl DeployReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.not_attempted.is_empty()
    }

    pub fn first_error(&self) -> Option<&StagehandError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }
}
