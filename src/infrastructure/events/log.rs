//! Log Event Sink
//!
//! Writes deploy events as `tracing` records for humans at a terminal.

use crate::domain::ports::{DeployEvent, DeployEventSink};

#[derive(Debug, Default)]
pub struct LogEventSink;

impl DeployEventSink for LogEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::Started {
                stage,
                hosts,
                parallel,
            } => {
                tracing::info!(%stage, hosts = hosts.len(), parallel, "deploy started");
            }
            DeployEvent::StepStarted { host, step } => {
                tracing::info!(%host, %step, "step started");
            }
            DeployEvent::StepCompleted { host, step } => {
                tracing::debug!(%host, %step, "step completed");
            }
            DeployEvent::StepSkipped { host, step, reason } => {
                tracing::info!(%host, %step, %reason, "step skipped");
            }
            DeployEvent::ReleaseCreated { host, release } => {
                tracing::info!(%host, %release, "release created");
            }
            DeployEvent::PruneWarning {
                host,
                release,
                error,
            } => {
                tracing::warn!(%host, %release, %error, "could not remove old release");
            }
            DeployEvent::HostSucceeded { host, release } => {
                tracing::info!(%host, %release, "host deployed");
            }
            DeployEvent::HostFailed { host, step, error } => {
                tracing::error!(%host, %step, %error, "host failed");
            }
            DeployEvent::Completed { succeeded, failed } => {
                tracing::info!(succeeded, failed, "deploy finished");
            }
        }
    }
}
