//! `releases` command handlers

use anyhow::{Context as _, Result};

use stagehand::application::release::APP_ROLE;
use stagehand::application::{AppServices, ReleaseManager, ReleaseSettings, ServiceSettings};
use stagehand::domain::ports::ShellConnector;
use stagehand::presentation::factory::create_connector;
use stagehand::presentation::output::{render_prune, render_releases};
use stagehand::presentation::{HostFilter, ReleasesCommand};
use stagehand::{PipelineStage, ReleaseId, RestartMode};

use super::{confirm_stage, Context};

pub fn cmd_releases(ctx: &Context, command: ReleasesCommand) -> Result<()> {
    match command {
        ReleasesCommand::List { stage, host } => cmd_list(ctx, &stage, host),
        ReleasesCommand::Promote {
            stage,
            release,
            host,
            yes,
        } => cmd_promote(ctx, &stage, &release, host, yes),
        ReleasesCommand::Prune { stage, keep, host } => cmd_prune(ctx, &stage, keep, host),
    }
}

fn host_filter(host: Option<String>) -> HostFilter {
    HostFilter { role: None, host }
}

fn cmd_list(ctx: &Context, stage: &str, host: Option<String>) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let targets = ctx.targets(&stage, &host_filter(host))?;
    let connector = create_connector(&ctx.config);
    let settings = ReleaseSettings::from_config(&ctx.config);

    for target in &targets {
        let shell = connector.connect(&target.host);
        let manager = ReleaseManager::new(shell.as_ref(), &settings);
        let releases = manager
            .list_releases()
            .with_context(|| format!("listing releases on {}", target.host))?;
        let current = manager.current_release()?;
        print!(
            "{}",
            render_releases(&target.host, &releases, current.as_ref(), ctx.format())
        );
    }
    Ok(())
}

/// Point `current` at an existing release and reload services on app hosts.
fn cmd_promote(
    ctx: &Context,
    stage: &str,
    release: &str,
    host: Option<String>,
    yes: bool,
) -> Result<()> {
    let release: ReleaseId = release.parse().map_err(anyhow::Error::msg)?;
    let stage = ctx.stage(stage)?;
    let targets = ctx.targets(&stage, &host_filter(host))?;

    if !confirm_stage(&stage, &format!("promote {} on", release), yes)? {
        return Ok(());
    }

    let connector = create_connector(&ctx.config);
    let settings = ReleaseSettings::from_config(&ctx.config);
    let services = ServiceSettings::from_config(&ctx.config);

    for target in &targets {
        ctx.cancel.check(PipelineStage::Promoted)?;
        let shell = connector.connect(&target.host);
        ReleaseManager::new(shell.as_ref(), &settings)
            .promote_existing(&release)
            .with_context(|| format!("promoting {} on {}", release, target.host))?;

        if target.has_role(APP_ROLE) {
            ctx.cancel.check(PipelineStage::Restarted)?;
            AppServices::new(shell.as_ref(), &services)
                .restart(RestartMode::Graceful)
                .with_context(|| format!("reloading services on {}", target.host))?;
        }
        tracing::info!(host = %target.host, release = %release, "release promoted");
        if !ctx.json {
            println!("{}: current -> {}", target.host, release);
        }
    }
    Ok(())
}

fn cmd_prune(ctx: &Context, stage: &str, keep: Option<usize>, host: Option<String>) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let targets = ctx.targets(&stage, &host_filter(host))?;
    let connector = create_connector(&ctx.config);
    let settings = ReleaseSettings::from_config(&ctx.config);
    let keep = keep.unwrap_or(settings.keep);

    for target in &targets {
        ctx.cancel.check(PipelineStage::Pruned)?;
        let shell = connector.connect(&target.host);
        let report = ReleaseManager::new(shell.as_ref(), &settings)
            .prune(keep)
            .with_context(|| format!("pruning releases on {}", target.host))?;
        print!("{}", render_prune(&target.host, &report, ctx.format()));
    }
    Ok(())
}
