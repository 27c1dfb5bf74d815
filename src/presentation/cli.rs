//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (`--config`, `--json`, `-v`) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::ServiceAction;

/// Stagehand - release manager for multi-stage EC2 fleets
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to stagehand.toml (default: ./stagehand.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit NDJSON events / JSON output for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Hosts to act on within a stage
#[derive(Args, Debug, Clone, Default)]
pub struct HostFilter {
    /// Only hosts with this role
    #[arg(long)]
    pub role: Option<String>,

    /// Only this host (address or instance id)
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and refresh the host inventory
    #[command(subcommand)]
    Hosts(HostsCommand),

    /// Create the release directory layout on every host of a stage
    Prepare {
        stage: String,

        #[command(flatten)]
        filter: HostFilter,
    },

    /// Manage the shared environment file on hosts
    #[command(subcommand)]
    Env(EnvCommand),

    /// Build a new release on every host of a stage and make it live
    Deploy {
        stage: String,

        #[command(flatten)]
        filter: HostFilter,

        /// Stop and start services instead of a graceful reload
        #[arg(long)]
        full_restart: bool,

        /// Deploy to all hosts at once
        #[arg(long)]
        parallel: bool,

        /// Skip the confirmation prompt for protected stages
        #[arg(short, long)]
        yes: bool,

        /// Do not run schema or data migrations
        #[arg(long)]
        skip_migrations: bool,

        /// Fast-forward the stage branch from project.main_branch and push
        /// it before deploying
        #[arg(long)]
        merge: bool,
    },

    /// Move a stage branch to the tip of the main branch
    #[command(subcommand)]
    Branch(BranchCommand),

    /// Install the web server virtual host on app hosts
    #[command(subcommand)]
    Vhost(VhostCommand),

    /// List, promote and prune releases
    #[command(subcommand)]
    Releases(ReleasesCommand),

    /// Control the process manager and web server on app hosts
    App {
        #[arg(value_enum)]
        action: AppAction,

        stage: String,

        /// Only this host (address or instance id)
        #[arg(long)]
        host: Option<String>,
    },

    /// Render an ECS task definition to stdout
    Render {
        /// Environment name; reads <environments_dir>/<environment>.yml
        environment: String,

        /// Git hash substituted for __GIT_HASH__ and the image tag
        git_hash: String,

        /// "true" emits cpu and memory as JSON numbers
        integer_resources: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostsCommand {
    /// Print the persisted inventory
    List {
        #[arg(long)]
        stage: Option<String>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Query the provider and rewrite the hosts file
    Refresh {
        /// Show the changes without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare provider state against the hosts file
    Diff,
}

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Upload the local env file for a stage as the hosts' shared env, and
    /// the secrets directory into the cached copy
    Push {
        stage: String,

        #[command(flatten)]
        filter: HostFilter,

        /// Only upload the env file
        #[arg(long)]
        skip_secrets: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BranchCommand {
    /// Merge the main branch into the stage branch and push it
    Promote {
        stage: String,

        /// Source branch (default: project.main_branch)
        #[arg(long)]
        from: Option<String>,

        /// Reset the stage branch instead of fast-forwarding, and force push
        #[arg(long)]
        hard: bool,

        /// Skip the confirmation prompt for protected stages
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum VhostCommand {
    /// Upload services.vhost_file, enable it and reload the web server
    Push {
        stage: String,

        /// Only this host (address or instance id)
        #[arg(long)]
        host: Option<String>,

        /// Skip the confirmation prompt for protected stages
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReleasesCommand {
    /// Show releases on each host, marking the live one
    List {
        stage: String,

        #[arg(long)]
        host: Option<String>,
    },

    /// Point `current` at an existing release
    Promote {
        stage: String,

        release: String,

        #[arg(long)]
        host: Option<String>,

        /// Skip the confirmation prompt for protected stages
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete releases beyond the newest N
    Prune {
        stage: String,

        /// Releases to keep (default: release.keep)
        #[arg(long)]
        keep: Option<usize>,

        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Status,
    Start,
    Stop,
    Restart,
    ForceRestart,
}

impl From<AppAction> for ServiceAction {
    fn from(action: AppAction) -> Self {
        match action {
            AppAction::Status => ServiceAction::Status,
            AppAction::Start => ServiceAction::Start,
            AppAction::Stop => ServiceAction::Stop,
            AppAction::Restart => ServiceAction::Restart,
            AppAction::ForceRestart => ServiceAction::ForceRestart,
        }
    }
}

/// Integer resources are on only for the literal `"true"`.
pub fn integer_resources_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}
