//! Deploy Pipeline
//!
//! Drives one or more hosts through
//! fetch → release → build → promote → migrate → restart → prune.
//! A failing step stops that host; completed steps are not undone.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::cancel::CancellationToken;
use crate::application::services::{AppServices, ServiceSettings};
use crate::domain::entities::DeployTarget;
use crate::domain::ports::{DeployEvent, DeployEventSink, NoopEventSink, ShellConnector};
use crate::domain::value_objects::{PipelineStage, ReleaseId};
use crate::error::{StagehandError, StagehandResult};

use super::manager::ReleaseManager;
use super::options::{DeployOptions, ReleaseSettings};
use super::result::{DeployReport, HostOutcome};

/// Role whose hosts run services and migrations
pub const APP_ROLE: &str = "app";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct DeployPipeline<'a> {
    connector: &'a dyn ShellConnector,
    release: ReleaseSettings,
    services: ServiceSettings,
    events: Arc<dyn DeployEventSink>,
    cancel: CancellationToken,
    clock: Clock,
}

impl<'a> DeployPipeline<'a> {
    pub fn new(
        connector: &'a dyn ShellConnector,
        release: ReleaseSettings,
        services: ServiceSettings,
    ) -> Self {
        Self {
            connector,
            release,
            services,
            events: Arc::new(NoopEventSink),
            cancel: CancellationToken::new(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Deploy to every target.
    ///
    /// Sequential runs stop at the first failed host. Parallel runs give each
    /// host its own thread and let the others finish.
    pub fn run(&self, stage: &str, targets: &[DeployTarget], options: &DeployOptions) -> DeployReport {
        self.events.on_event(DeployEvent::Started {
            stage: stage.to_string(),
            hosts: targets.iter().map(|t| t.host.clone()).collect(),
            parallel: options.parallel,
        });

        let migrator = migration_host(targets);
        let mut report = DeployReport::default();

        if options.parallel {
            let results: Vec<HostOutcome> = std::thread::scope(|scope| {
                let handles: Vec<_> = targets
                    .iter()
                    .map(|target| {
                        let migrate = migrator == Some(target.host.as_str());
                        scope.spawn(move || self.deploy_host(target, migrate, options))
                    })
                    .collect();
                handles
                    .into_iter()
                    .zip(targets)
                    .map(|(handle, target)| HostOutcome {
                        host: target.host.clone(),
                        result: handle.join().unwrap_or_else(|_| {
                            Err(StagehandError::PipelineFailed {
                                host: target.host.clone(),
                                stage: PipelineStage::Fetching,
                                source: Box::new(StagehandError::Io(std::io::Error::other(
                                    "deploy thread panicked",
                                ))),
                            })
                        }),
                    })
                    .collect()
            });
            report.outcomes = results;
        } else {
            for (index, target) in targets.iter().enumerate() {
                let migrate = migrator == Some(target.host.as_str());
                let result = self.deploy_host(target, migrate, options);
                let stop = result.is_err();
                report.outcomes.push(HostOutcome {
                    host: target.host.clone(),
                    result,
                });
                if stop {
                    report.not_attempted = targets[index + 1..]
                        .iter()
                        .map(|t| t.host.clone())
                        .collect();
                    break;
                }
            }
        }

        self.events.on_event(DeployEvent::Completed {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });
        report
    }

    /// Full pipeline on one host.
    pub fn deploy_host(
        &self,
        target: &DeployTarget,
        migrate: bool,
        options: &DeployOptions,
    ) -> StagehandResult<ReleaseId> {
        let result = self.pipeline(target, migrate, options);
        match &result {
            Ok(release) => self.events.on_event(DeployEvent::HostSucceeded {
                host: target.host.clone(),
                release: release.clone(),
            }),
            Err(err) => self.events.on_event(DeployEvent::HostFailed {
                host: target.host.clone(),
                step: err.stage().unwrap_or(PipelineStage::Fetching),
                error: err.to_string(),
            }),
        }
        result
    }

    fn pipeline(
        &self,
        target: &DeployTarget,
        migrate: bool,
        options: &DeployOptions,
    ) -> StagehandResult<ReleaseId> {
        let host = target.host.as_str();
        let shell = self.connector.connect(host);
        let manager = ReleaseManager::new(shell.as_ref(), &self.release);

        self.step(host, PipelineStage::Fetching, || manager.fetch(&options.branch))?;

        let release = self.step(host, PipelineStage::Released, || {
            let id = manager.create_release((self.clock)())?;
            self.events.on_event(DeployEvent::ReleaseCreated {
                host: host.to_string(),
                release: id.clone(),
            });
            manager.materialize(&id)?;
            manager.copy_environment(&id)?;
            Ok(id)
        })?;

        self.step(host, PipelineStage::Built, || manager.build_apps(&release))?;
        self.step(host, PipelineStage::Promoted, || manager.promote(&release))?;

        if options.skip_migrations {
            self.skip(host, PipelineStage::Migrated, "migrations disabled")?;
        } else if !migrate {
            self.skip(host, PipelineStage::Migrated, "migrations run on another host")?;
        } else {
            self.step(host, PipelineStage::Migrated, || manager.run_migrations().map(|_| ()))?;
        }

        if target.has_role(APP_ROLE) {
            let services = AppServices::new(shell.as_ref(), &self.services);
            self.step(host, PipelineStage::Restarted, || services.restart(options.restart))?;
        } else {
            self.skip(host, PipelineStage::Restarted, "no app role")?;
        }

        let pruned = self.step(host, PipelineStage::Pruned, || manager.prune(self.release.keep))?;
        for (release, error) in pruned.failed {
            self.events.on_event(DeployEvent::PruneWarning {
                host: host.to_string(),
                release,
                error,
            });
        }

        Ok(release)
    }

    fn step<T>(
        &self,
        host: &str,
        stage: PipelineStage,
        f: impl FnOnce() -> StagehandResult<T>,
    ) -> StagehandResult<T> {
        self.cancel.check(stage)?;
        self.events.on_event(DeployEvent::StepStarted {
            host: host.to_string(),
            step: stage,
        });
        let value = f().map_err(|source| StagehandError::PipelineFailed {
            host: host.to_string(),
            stage,
            source: Box::new(source),
        })?;
        self.events.on_event(DeployEvent::StepCompleted {
            host: host.to_string(),
            step: stage,
        });
        Ok(value)
    }

    fn skip(&self, host: &str, stage: PipelineStage, reason: &str) -> StagehandResult<()> {
        self.cancel.check(stage)?;
        self.events.on_event(DeployEvent::StepSkipped {
            host: host.to_string(),
            step: stage,
            reason: reason.to_string(),
        });
        Ok(())
    }
}

/// Host that runs migrations: the first app host, else the first host.
pub fn migration_host(targets: &[DeployTarget]) -> Option<&str> {
    targets
        .iter()
        .find(|t| t.has_role(APP_ROLE))
        .or_else(|| targets.first())
        .map(|t| t.host.as_str())
}
