use anyhow::{Context as _, Result};
use serde_json::json;

use stagehand::application::release::APP_ROLE;
use stagehand::application::{AppServices, ServiceSettings, VirtualHost};
use stagehand::domain::ports::ShellConnector;
use stagehand::presentation::factory::create_connector;
use stagehand::presentation::{HostFilter, VhostCommand};
use stagehand::{PipelineStage, StagehandError};

use super::{confirm_stage, Context};

pub fn cmd_vhost(ctx: &Context, command: VhostCommand) -> Result<()> {
    match command {
        VhostCommand::Push { stage, host, yes } => cmd_push(ctx, &stage, host, yes),
    }
}

/// Install the local virtual host file on every app host of a stage.
fn cmd_push(ctx: &Context, stage: &str, host: Option<String>, yes: bool) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let local = ctx.config.vhost_file();
    let content = std::fs::read(&local).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StagehandError::ConfigNotFound {
            path: local.clone(),
        },
        _ => StagehandError::Io(e),
    })?;

    let filter = HostFilter {
        role: Some(APP_ROLE.to_string()),
        host,
    };
    let targets = ctx.targets(&stage, &filter)?;
    if !confirm_stage(&stage, "install the virtual host on", yes)? {
        return Ok(());
    }

    let connector = create_connector(&ctx.config);
    let settings = ServiceSettings::from_config(&ctx.config);
    let vhost = VirtualHost::from_config(&ctx.config);

    for target in &targets {
        ctx.cancel.check(PipelineStage::Restarted)?;
        let shell = connector.connect(&target.host);
        AppServices::new(shell.as_ref(), &settings)
            .install_virtual_host(&vhost, &content)
            .with_context(|| format!("installing {} on {}", local.display(), target.host))?;

        if ctx.json {
            println!(
                "{}",
                json!({ "event": "vhost", "host": target.host, "path": vhost.available })
            );
        } else {
            println!("{} -> {}:{}", local.display(), target.host, vhost.available);
        }
    }
    Ok(())
}
