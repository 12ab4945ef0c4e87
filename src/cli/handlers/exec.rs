// src/cli/handlers/exec.rs

use crate::{
    CancellationToken,
    cli::{ToolExit, args::ExecArgs, handlers::commons},
    constants::INTERRUPTED_EXIT_CODE,
    core::config_loader,
    models::{OutputEvent, OutputKind},
    system::{
        executor::is_cancelled,
        tool_runner::{self, RunSettings, ToolError},
    },
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// The main handler for the `exec` command.
/// Runs the tool, echoing its output live, and exits with the tool's exit code.
pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let exec_args = ExecArgs::try_parse_from(&args)?;
    let (manifest, store) = commons::load_with_assignments(&exec_args.manifest, &exec_args.set)?;

    let config = config_loader::load_config(exec_args.config.as_deref())
        .context("Failed to load configuration")?;
    let mut settings = RunSettings::from_config(&config)?;
    apply_overrides(&mut settings, &exec_args);
    settings.cancellation = Some(cancellation_token.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let result = runtime.block_on(async {
        let signal_token = cancellation_token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_token.store(true, Ordering::SeqCst);
            }
        });
        let result = tool_runner::run_manifest_with(&manifest, &store, &settings, print_event).await;
        watcher.abort();
        result
    })?;

    if result.outcome.cancelled && is_cancelled(cancellation_token) {
        return Err(ToolExit {
            code: INTERRUPTED_EXIT_CODE,
        }
        .into());
    }

    match result.ensure_success() {
        Ok(_) => Ok(()),
        Err(ToolError::NonZeroExit { code, .. }) => Err(ToolExit { code }.into()),
        Err(e) => {
            eprintln!("{} {}", "Timed out:".yellow().bold(), result.command_line);
            Err(e.into())
        }
    }
}

fn apply_overrides(settings: &mut RunSettings, args: &ExecArgs) {
    if let Some(secs) = args.timeout {
        settings.timeout = Some(Duration::from_secs(secs));
    }
    if args.no_stdout {
        settings.capture_stdout = false;
    }
    if args.no_stderr {
        settings.capture_stderr = false;
    }
    settings.variant = commons::variant(args.alt);
    // Output is echoed as it arrives; logging it as well would print it twice.
    settings.log_output = false;
}

fn print_event(event: &OutputEvent) {
    match event.kind {
        OutputKind::Std => println!("{}", event.text),
        OutputKind::Err => eprintln!("{}", event.text),
    }
}
