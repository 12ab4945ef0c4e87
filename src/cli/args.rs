// src/cli/args.rs
use clap::Parser;
use std::path::PathBuf;

/// Arguments of the `render` action.
#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the argument string a tool manifest renders to."
)]
pub struct RenderArgs {
    /// Path to the tool manifest (TOML).
    pub manifest: PathBuf,

    /// Assign an option, e.g. `-s Verbosity=minimal`, `-s NoRestore` or `-s Properties=Key=Value`.
    #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Use the alternative format of options that declare one.
    #[arg(long)]
    pub alt: bool,

    /// Print secret values instead of masking them.
    #[arg(long)]
    pub show_secrets: bool,
}

/// Arguments of the `exec` action.
#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs the tool described by a manifest and streams its output."
)]
pub struct ExecArgs {
    /// Path to the tool manifest (TOML).
    pub manifest: PathBuf,

    /// Assign an option (see `render --help`).
    #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Kill the tool after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not capture standard output.
    #[arg(long)]
    pub no_stdout: bool,

    /// Do not capture standard error.
    #[arg(long)]
    pub no_stderr: bool,

    /// Use the alternative format of options that declare one.
    #[arg(long)]
    pub alt: bool,

    /// Explicit configuration file (overrides TOOLWIRE_CONFIG and the default lookup).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments of the `describe` action.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the options a tool manifest declares.")]
pub struct DescribeArgs {
    /// Path to the tool manifest (TOML).
    pub manifest: PathBuf,

    /// Print the manifest as JSON.
    #[arg(long)]
    pub json: bool,
}
