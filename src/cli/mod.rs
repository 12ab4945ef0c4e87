use clap::Parser;
use thiserror::Error;

/// Per-action argument parsers.
pub mod args;
/// Action handlers.
pub mod handlers;

/// Carries the exit code of a finished tool up to `main`, which exits with it
/// without printing anything else.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Tool exited with code {code}.")]
pub struct ToolExit {
    /// The exit code reported by the tool.
    pub code: i32,
}

/// toolwire: render and run command-line tools from typed option manifests.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The action to run: render, exec or describe.
    pub action: Option<String>,

    /// Arguments for the action. Run `toolwire <action> --help` for details.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
