//! Error types for Stagehand
//!
//! Library code returns `StagehandError`; the binary wraps it in `anyhow`
//! and prints the chain before exiting non-zero.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ports::ShellError;
use crate::domain::value_objects::{PipelineStage, ReleaseId};

/// Result type alias for Stagehand operations
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Main error type for Stagehand operations
#[derive(Error, Debug)]
pub enum StagehandError {
    /// A required configuration or stage file does not exist
    #[error("configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but could not be deserialized
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// The stage is not declared in `[stages]`
    #[error("unknown stage '{stage}' (known: {known})")]
    UnknownStage { stage: String, known: String },

    /// Malformed inventory row, YAML document or template
    #[error("{}", format_parse_error(.source_name, .line, .message))]
    Parse {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    /// Non-zero exit from a remote step
    #[error("command failed on {host} (exit {status}): {command}\n{stderr}")]
    RemoteCommandFailed {
        host: String,
        command: String,
        status: i32,
        stderr: String,
    },

    /// A remote step ran past its deadline and was killed
    #[error("command timed out on {host} after {}s: {command}", .after.as_secs())]
    Timeout {
        host: String,
        command: String,
        after: Duration,
    },

    /// The local process for a remote step could not be started
    #[error("could not start command for {host}: {command}: {source}")]
    Spawn {
        host: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The cloud inventory could not be queried (retryable by the caller)
    #[error("inventory provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// A release with the same identifier already exists on the host
    #[error("release {release} already exists on {host}; wait a second and retry")]
    ReleaseCollision { release: ReleaseId, host: String },

    /// `releases promote` named a release that is not on the host
    #[error("release {release} not found on {host}")]
    ReleaseNotFound { release: ReleaseId, host: String },

    /// The local checkout is not in a state a stage branch can be moved from
    #[error("cannot update branch {branch}: {reason}")]
    BranchNotReady { branch: String, reason: String },

    /// Operator interrupted the run; the pipeline stopped before `stage`
    #[error("cancelled before {stage}")]
    Cancelled { stage: PipelineStage },

    /// A pipeline step failed; nothing is rolled back
    #[error("deploy to {host} failed at {stage}: {source}")]
    PipelineFailed {
        host: String,
        stage: PipelineStage,
        #[source]
        source: Box<StagehandError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl StagehandError {
    /// Attach the host a shell error came from.
    pub fn from_shell(host: &str, err: ShellError) -> Self {
        match err {
            ShellError::Failed {
                command,
                status,
                stderr,
            } => StagehandError::RemoteCommandFailed {
                host: host.to_string(),
                command,
                status,
                stderr,
            },
            ShellError::Timeout { command, after } => StagehandError::Timeout {
                host: host.to_string(),
                command,
                after,
            },
            ShellError::Spawn { command, source } => StagehandError::Spawn {
                host: host.to_string(),
                command,
                source,
            },
        }
    }

    pub fn parse(source_name: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        StagehandError::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Stage at which a pipeline stopped, if this error came from one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            StagehandError::PipelineFailed { stage, .. } => Some(*stage),
            StagehandError::Cancelled { stage } => Some(*stage),
            _ => None,
        }
    }
}

fn format_parse_error(source_name: &str, line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("parse error in {}:{}: {}", source_name, line, message),
        None => format!("parse error in {}: {}", source_name, message),
    }
}
