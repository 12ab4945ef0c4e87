// src/cli/handlers/render.rs

use crate::{
    CancellationToken,
    cli::{args::RenderArgs, handlers::commons},
    core::render::{self, RenderOptions},
};
use anyhow::Result;
use clap::Parser;

/// The main handler for the `render` command.
pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let render_args = RenderArgs::try_parse_from(&args)?;
    println!("{}", render_line(&render_args)?);
    Ok(())
}

fn render_line(args: &RenderArgs) -> Result<String> {
    let (manifest, store) = commons::load_with_assignments(&args.manifest, &args.set)?;
    let schema = manifest.schema()?;
    let tokens = render::render_store(
        &schema,
        &store,
        RenderOptions {
            variant: commons::variant(args.alt),
            redact_secrets: !args.show_secrets,
        },
    )?;
    Ok(manifest.binding().command_line(&tokens))
}
