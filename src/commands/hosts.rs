//! `hosts` command handlers

use anyhow::Result;
use serde_json::json;

use stagehand::presentation::factory::create_host_registry;
use stagehand::presentation::output::render_hosts;
use stagehand::presentation::HostsCommand;

use super::Context;

pub fn cmd_hosts(ctx: &Context, command: HostsCommand) -> Result<()> {
    match command {
        HostsCommand::List { stage, role } => cmd_list(ctx, stage.as_deref(), role.as_deref()),
        HostsCommand::Refresh { dry_run } => cmd_refresh(ctx, dry_run),
        HostsCommand::Diff => cmd_diff(ctx),
    }
}

fn cmd_list(ctx: &Context, stage: Option<&str>, role: Option<&str>) -> Result<()> {
    let registry = create_host_registry(&ctx.config);
    let records = registry.select(stage, role)?;
    print!("{}", render_hosts(&records, ctx.format()));
    Ok(())
}

fn cmd_refresh(ctx: &Context, dry_run: bool) -> Result<()> {
    let registry = create_host_registry(&ctx.config);
    let diff = registry.refresh_and_persist(dry_run)?;
    let path = ctx.config.hosts_file();

    if ctx.json {
        println!(
            "{}",
            json!({
                "event": "hosts_refreshed",
                "file": path.display().to_string(),
                "records": diff.refreshed.len(),
                "changed": !diff.is_unchanged(),
                "dry_run": dry_run,
            })
        );
        return Ok(());
    }

    if diff.is_unchanged() {
        println!("{} is up to date ({} records)", path.display(), diff.refreshed.len());
        return Ok(());
    }
    print!("{}", diff.unified);
    if dry_run {
        println!("Dry run: {} not written", path.display());
    } else {
        println!("Wrote {} records to {}", diff.refreshed.len(), path.display());
    }
    Ok(())
}

fn cmd_diff(ctx: &Context) -> Result<()> {
    let registry = create_host_registry(&ctx.config);
    let diff = registry.diff()?;

    if ctx.json {
        println!(
            "{}",
            json!({
                "event": "hosts_diff",
                "changed": !diff.is_unchanged(),
                "persisted": diff.persisted.len(),
                "provider": diff.refreshed.len(),
                "diff": diff.unified,
            })
        );
    } else if diff.is_unchanged() {
        println!("No changes");
    } else {
        print!("{}", diff.unified);
    }
    Ok(())
}
