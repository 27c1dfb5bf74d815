use std::io::Write;

use anyhow::{Context as _, Result};

use stagehand::presentation::cli::integer_resources_flag;
use stagehand::presentation::factory::create_render_use_case;

use super::Context;

/// Print the rendered task definition for `environment` to stdout.
pub fn cmd_render(
    ctx: &Context,
    environment: &str,
    git_hash: &str,
    integer_resources: Option<&str>,
) -> Result<()> {
    let options = ctx
        .config
        .render_options(integer_resources_flag(integer_resources));
    let rendered = create_render_use_case(&ctx.config)
        .render(environment, git_hash, &options)
        .with_context(|| format!("rendering task definition for {}", environment))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
