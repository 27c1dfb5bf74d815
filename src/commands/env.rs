use anyhow::{Context as _, Result};

use stagehand::application::EnvironmentPush;
use stagehand::domain::ports::ShellConnector;
use stagehand::infrastructure::collect_secret_files;
use stagehand::presentation::factory::create_connector;
use stagehand::presentation::{EnvCommand, HostFilter};
use stagehand::{PipelineStage, StagehandError};

use super::Context;

pub fn cmd_env(ctx: &Context, command: EnvCommand) -> Result<()> {
    match command {
        EnvCommand::Push {
            stage,
            filter,
            skip_secrets,
        } => cmd_push(ctx, &stage, &filter, skip_secrets),
    }
}

/// Upload the stage's local env file to `shared/env` on each host, then the
/// secrets directory into the cached copy.
///
/// The next release picks both up: the env file when its environment is
/// copied in, the secrets through the `/secrets` shared link.
fn cmd_push(ctx: &Context, stage: &str, filter: &HostFilter, skip_secrets: bool) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let local = ctx.config.env_file(&stage.name);
    let content = std::fs::read(&local).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StagehandError::ConfigNotFound {
            path: local.clone(),
        },
        _ => StagehandError::Io(e),
    })?;

    let secrets = match ctx.config.secrets_dir() {
        Some(dir) if !skip_secrets => {
            let files = collect_secret_files(&dir)
                .with_context(|| format!("reading {}", dir.display()))?;
            if files.is_empty() {
                tracing::info!(dir = %dir.display(), "no secrets to upload");
            }
            files
        }
        _ => Vec::new(),
    };

    let targets = ctx.targets(&stage, filter)?;
    let connector = create_connector(&ctx.config);
    let remote_env = ctx.config.layout().shared_env();
    let remote_secrets = ctx.config.remote_secrets_dir();

    for target in &targets {
        ctx.cancel.check(PipelineStage::Released)?;
        let shell = connector.connect(&target.host);
        let push = EnvironmentPush::new(shell.as_ref());
        push.push_env(&remote_env, &content)
            .with_context(|| format!("uploading {} to {}", local.display(), target.host))?;
        if !secrets.is_empty() {
            push.push_secrets(&remote_secrets, &secrets)
                .with_context(|| format!("uploading secrets to {}", target.host))?;
        }

        if !ctx.json {
            println!("{} -> {}:{}", local.display(), target.host, remote_env);
            if !secrets.is_empty() {
                println!(
                    "{} secret file(s) -> {}:{}",
                    secrets.len(),
                    target.host,
                    remote_secrets
                );
            }
        }
    }
    Ok(())
}
