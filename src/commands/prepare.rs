use anyhow::{Context as _, Result};

use stagehand::application::{ReleaseManager, ReleaseSettings};
use stagehand::domain::ports::ShellConnector;
use stagehand::presentation::factory::create_connector;
use stagehand::presentation::HostFilter;
use stagehand::PipelineStage;

use super::Context;

/// Create releases/, shared/ and the cached copy on every selected host.
pub fn cmd_prepare(ctx: &Context, stage: &str, filter: &HostFilter) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let targets = ctx.targets(&stage, filter)?;
    let connector = create_connector(&ctx.config);
    let settings = ReleaseSettings::from_config(&ctx.config);

    for target in &targets {
        ctx.cancel.check(PipelineStage::Fetching)?;
        let shell = connector.connect(&target.host);
        ReleaseManager::new(shell.as_ref(), &settings)
            .prepare_host()
            .with_context(|| format!("preparing {}", target.host))?;
        if !ctx.json {
            println!("prepared {}:{}", target.host, settings.layout.app_root());
        }
    }
    Ok(())
}
