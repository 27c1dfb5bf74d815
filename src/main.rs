//! Stagehand CLI - release manager for multi-stage EC2 fleets
//!
//! Usage: stagehand <COMMAND>
//!
//! Commands:
//!   hosts     Inspect and refresh the host inventory
//!   prepare   Create the release layout on hosts
//!   env       Push the shared environment file
//!   deploy    Ship a new release to a stage
//!   branch    Move a stage branch to the main branch
//!   vhost     Install the web server virtual host
//!   releases  List, promote and prune releases
//!   app       Control app services
//!   render    Render an ECS task definition

mod commands;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stagehand::application::CancellationToken;
use stagehand::presentation::{Cli, Commands};

use commands::deploy::DeployFlags;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received; stopping after the current step");
        handler_token.cancel();
    })
    .context("failed to install Ctrl+C handler")?;

    let ctx = commands::Context::load(cli.config.as_deref(), cli.json, cancel)?;

    match cli.command {
        Commands::Hosts(command) => commands::hosts::cmd_hosts(&ctx, command),
        Commands::Prepare { stage, filter } => commands::prepare::cmd_prepare(&ctx, &stage, &filter),
        Commands::Env(command) => commands::env::cmd_env(&ctx, command),
        Commands::Deploy {
            stage,
            filter,
            full_restart,
            parallel,
            yes,
            skip_migrations,
            merge,
        } => {
            let flags = DeployFlags {
                full_restart,
                parallel,
                yes,
                skip_migrations,
                merge,
            };
            commands::deploy::cmd_deploy(&ctx, &stage, &filter, &flags)
        }
        Commands::Branch(command) => commands::branch::cmd_branch(&ctx, command),
        Commands::Vhost(command) => commands::vhost::cmd_vhost(&ctx, command),
        Commands::Releases(command) => commands::releases::cmd_releases(&ctx, command),
        Commands::App {
            action,
            stage,
            host,
        } => commands::app::cmd_app(&ctx, action, &stage, host),
        Commands::Render {
            environment,
            git_hash,
            integer_resources,
        } => commands::render::cmd_render(&ctx, &environment, &git_hash, integer_resources.as_deref()),
    }
}

/// Logs go to stderr so `render` and `--json` output stay machine-readable.
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}
