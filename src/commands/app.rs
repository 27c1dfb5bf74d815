use anyhow::{Context as _, Result};
use serde_json::json;

use stagehand::application::release::APP_ROLE;
use stagehand::application::{AppServices, ServiceAction, ServiceSettings};
use stagehand::domain::ports::ShellConnector;
use stagehand::presentation::factory::create_connector;
use stagehand::presentation::{AppAction, HostFilter};

use super::Context;

/// Run a lifecycle action on the app hosts of a stage.
pub fn cmd_app(ctx: &Context, action: AppAction, stage: &str, host: Option<String>) -> Result<()> {
    let stage = ctx.stage(stage)?;
    let filter = HostFilter {
        role: Some(APP_ROLE.to_string()),
        host,
    };
    let targets = ctx.targets(&stage, &filter)?;
    let connector = create_connector(&ctx.config);
    let settings = ServiceSettings::from_config(&ctx.config);
    let action = ServiceAction::from(action);

    for target in &targets {
        let shell = connector.connect(&target.host);
        let output = AppServices::new(shell.as_ref(), &settings)
            .apply(action)
            .with_context(|| format!("{:?} on {}", action, target.host))?;

        if ctx.json {
            println!(
                "{}",
                json!({
                    "event": "app",
                    "host": target.host,
                    "action": format!("{:?}", action).to_lowercase(),
                    "output": output,
                })
            );
        } else if let Some(output) = output {
            println!("{}", target.host);
            print!("{}", output);
        } else {
            println!("{}: done", target.host);
        }
    }
    Ok(())
}
