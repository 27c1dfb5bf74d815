use anyhow::Result;

use stagehand::application::MergeMode;
use stagehand::presentation::factory::{create_connector, create_deploy_pipeline, create_event_sink};
use stagehand::presentation::output::render_deploy_summary;
use stagehand::presentation::HostFilter;
use stagehand::{DeployOptions, RestartMode};

use super::branch::promote_stage_branch;
use super::{confirm_stage, Context};

/// Deploy command switches
#[derive(Debug, Clone, Default)]
pub struct DeployFlags {
    pub full_restart: bool,
    pub parallel: bool,
    pub yes: bool,
    pub skip_migrations: bool,
    /// Fast-forward the stage branch from the main branch first
    pub merge: bool,
}

pub fn cmd_deploy(ctx: &Context, stage: &str, filter: &HostFilter, flags: &DeployFlags) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let targets = ctx.targets(&stage, filter)?;

    if !confirm_stage(&stage, "deploy to", flags.yes)? {
        return Ok(());
    }
    if flags.merge {
        promote_stage_branch(ctx, &stage, None, MergeMode::FastForward)?;
    }

    let restart = if flags.full_restart {
        RestartMode::Full
    } else {
        RestartMode::Graceful
    };
    let options = DeployOptions::new(stage.branch.clone())
        .with_restart(restart)
        .with_parallel(flags.parallel)
        .with_skip_migrations(flags.skip_migrations);

    tracing::info!(
        stage = %stage.name,
        branch = %options.branch,
        site = stage.site_root.as_deref().unwrap_or("-"),
        hosts = targets.len(),
        parallel = options.parallel,
        "deploy starting"
    );

    let connector = create_connector(&ctx.config);
    let pipeline = create_deploy_pipeline(&ctx.config, &connector, create_event_sink(ctx.json))
        .with_cancellation(ctx.cancel.clone());
    let report = pipeline.run(&stage.name, &targets, &options);

    if !ctx.json {
        print!("{}", render_deploy_summary(&stage.name, &report));
    }

    if report.is_success() {
        return Ok(());
    }
    match report.first_error() {
        Some(err) => anyhow::bail!("deploy to {} failed: {}", stage.name, err),
        None => anyhow::bail!(
            "deploy to {} stopped with {} host(s) not attempted",
            stage.name,
            report.not_attempted.len()
        ),
    }
}
