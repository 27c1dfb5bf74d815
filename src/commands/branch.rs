use anyhow::{Context as _, Result};

use stagehand::application::{BranchPromotion, MergeMode};
use stagehand::config::Stage;
use stagehand::presentation::factory::create_local_shell;
use stagehand::presentation::BranchCommand;

use super::{confirm_stage, Context};

pub fn cmd_branch(ctx: &Context, command: BranchCommand) -> Result<()> {
    match command {
        BranchCommand::Promote {
            stage,
            from,
            hard,
            yes,
        } => {
            let stage = ctx.stage(&stage)?;
            if !confirm_stage(&stage, "update the branch of", yes)? {
                return Ok(());
            }
            let mode = if hard {
                MergeMode::Hard
            } else {
                MergeMode::FastForward
            };
            promote_stage_branch(ctx, &stage, from.as_deref(), mode)
        }
    }
}

/// Move the stage's branch to `from` (default `project.main_branch`) in the
/// checkout holding the config file, and push it.
pub fn promote_stage_branch(
    ctx: &Context,
    stage: &Stage,
    from: Option<&str>,
    mode: MergeMode,
) -> Result<()> {
    let source = from.unwrap_or(ctx.config.project.main_branch.as_str());
    let checkout = ctx.config.base_dir.to_string_lossy().into_owned();
    let git = create_local_shell(&ctx.config);

    BranchPromotion::new(&git, checkout)
        .promote(source, &stage.branch, mode)
        .with_context(|| format!("promoting {} to {}", source, stage.branch))?;

    if !ctx.json {
        println!("{} -> {}", source, stage.branch);
    }
    Ok(())
}
