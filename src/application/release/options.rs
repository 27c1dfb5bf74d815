//! Release Options
//!
//! Settings the release manager and pipeline run with, derived from
//! `Config` once per run.

use crate::config::Config;
use crate::domain::entities::{ReleaseLayout, SharedLink};

/// How services are brought onto a new release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartMode {
    /// Web server HUP + process manager reload
    #[default]
    Graceful,
    /// Stop everything, then start
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationSettings {
    /// Relative to `current`
    pub working_dir: String,
    pub schema: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub layout: ReleaseLayout,
    pub repository: String,
    pub shared_links: Vec<SharedLink>,
    pub build_command: String,
    pub keep: usize,
    pub migrations: MigrationSettings,
}

impl ReleaseSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            layout: config.layout(),
            repository: config.project.repository.clone(),
            shared_links: config.shared_links(),
            build_command: config.release.build_command.clone(),
            keep: config.release.keep,
            migrations: MigrationSettings {
                working_dir: config.migrations.working_dir.clone(),
                schema: config.migrations.schema.clone(),
                data: config.migrations.data.clone(),
            },
        }
    }
}

/// Per-run deploy switches from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub branch: String,
    pub restart: RestartMode,
    pub parallel: bool,
    pub skip_migrations: bool,
}

impl DeployOptions {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            restart: RestartMode::Graceful,
            parallel: false,
            skip_migrations: false,
        }
    }

    pub fn with_restart(mut self, restart: RestartMode) -> Self {
        self.restart = restart;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_skip_migrations(mut self, skip: bool) -> Self {
        self.skip_migrations = skip;
        self
    }
}
