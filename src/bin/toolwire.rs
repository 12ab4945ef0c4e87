// src/bin/toolwire.rs

//! The `toolwire` command-line entry point.

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use toolwire::{
    CancellationToken,
    cli::{Cli, ToolExit, handlers},
};

// --- Command Definition and Registry ---

/// Defines an action, its aliases, and its synchronous handler function.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    about: &'static str,
    handler: fn(Vec<String>, &CancellationToken) -> Result<()>,
}

/// Every action the binary understands. To add one, add an entry here.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "describe",
        aliases: &["desc", "info"],
        about: "List the options a manifest declares",
        handler: handlers::describe::handle,
    },
    CommandDefinition {
        name: "exec",
        aliases: &["run"],
        about: "Run the tool and stream its output",
        handler: handlers::exec::handle,
    },
    CommandDefinition {
        name: "render",
        aliases: &["r"],
        about: "Print the rendered argument string",
        handler: handlers::render::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Sets up logging, dispatches to the handler and maps errors to exit codes.
fn main() {
    // Tripped by the Ctrl+C watcher of long-running handlers.
    let cancellation_token = Arc::new(AtomicBool::new(false));
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse(), cancellation_token) {
        // A tool that ran and failed (or was interrupted) already spoke for itself.
        if let Some(exit) = e.downcast_ref::<ToolExit>() {
            std::process::exit(exit.code);
        }
        // Handler argument errors carry clap's own help and usage output.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }

        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli, cancellation_token: CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(action) = cli.action else {
        print_actions();
        return Ok(());
    };

    let command = find_command(&action).ok_or_else(|| {
        anyhow!(
            "Unknown action '{}'. Available actions: {}",
            action.yellow(),
            COMMAND_REGISTRY
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    (command.handler)(cli.args, &cancellation_token)
}

fn print_actions() {
    println!("{}", "Usage: toolwire <action> <manifest> [options]".yellow().bold());
    println!();
    for command in COMMAND_REGISTRY {
        let aliases = if command.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", command.aliases.join(", "))
        };
        println!(
            "  {:<10} {}{}",
            command.name.cyan().bold(),
            command.about,
            aliases.dimmed()
        );
    }
}
