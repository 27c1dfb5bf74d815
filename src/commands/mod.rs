//! Command handlers
//!
//! Each handler loads what it needs from the shared [`Context`], calls the
//! library, and prints the result.

pub mod app;
pub mod branch;
pub mod deploy;
pub mod env;
pub mod hosts;
pub mod prepare;
pub mod releases;
pub mod render;
pub mod vhost;

use std::path::Path;

use anyhow::{Context as _, Result};
use is_terminal::IsTerminal;

use stagehand::application::CancellationToken;
use stagehand::config::{load_or_default, Stage};
use stagehand::domain::entities::DeployTarget;
use stagehand::presentation::factory::create_host_registry;
use stagehand::presentation::{HostFilter, OutputFormat};
use stagehand::Config;

/// Per-run state shared by all handlers
pub struct Context {
    pub config: Config,
    pub json: bool,
    pub cancel: CancellationToken,
}

impl Context {
    /// Load the config and report unknown keys.
    pub fn load(explicit: Option<&Path>, json: bool, cancel: CancellationToken) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let (config, warnings) = load_or_default(explicit, &cwd)?;
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!(
            project = %config.project.name,
            base_dir = %config.base_dir.display(),
            "configuration loaded"
        );
        Ok(Self {
            config,
            json,
            cancel,
        })
    }

    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }

    pub fn stage(&self, name: &str) -> Result<Stage> {
        Ok(self.config.stage(name)?)
    }

    /// Hosts of `stage` narrowed by `filter`; an empty selection is an error.
    pub fn targets(&self, stage: &Stage, filter: &HostFilter) -> Result<Vec<DeployTarget>> {
        let registry = create_host_registry(&self.config);
        let targets =
            registry.targets(&stage.name, filter.role.as_deref(), filter.host.as_deref())?;
        if targets.is_empty() {
            anyhow::bail!(
                "no {} hosts in {} (run `stagehand hosts refresh`)",
                stage.name,
                self.config.hosts_file().display()
            );
        }
        Ok(targets)
    }
}

/// Ask before touching a stage marked `confirm = true`.
///
/// Returns `false` when the operator declines. Without a terminal the
/// prompt cannot be shown, so `--yes` is required.
pub fn confirm_stage(stage: &Stage, action: &str, yes: bool) -> Result<bool> {
    if !stage.confirm || yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "{} requires confirmation; pass --yes to {} non-interactively",
            stage.name,
            action
        );
    }

    use dialoguer::Confirm;
    let confirmed = Confirm::new()
        .with_prompt(format!("{} {}?", action, stage.name))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Aborted.");
    }
    Ok(confirmed)
}
