//! # Tool Runner
//!
//! Composes the pieces into one call: resolve the binding, render the options
//! (once for real and once redacted for the log), resolve the tool path and run
//! the process with the configured settings.

use crate::CancellationToken;
use crate::core::config_loader::{ConfigError, RunnerConfig};
use crate::core::manifest::ToolManifest;
use crate::core::options::OptionSet;
use crate::core::registry::{CommandBinding, CommandRegistry};
use crate::core::render::{self, FormatVariant, RenderOptions};
use crate::core::schema::{ConfigurationError, Schema};
use crate::core::store::OptionStore;
use crate::models::{OutputEvent, OutputKind, ProcessOutcome};
use crate::system::executor::{ExecutionError, Invocation};
use crate::system::tool_path::{self, ToolPathError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a tool run.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The binding or options are invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The executable was not found.
    #[error(transparent)]
    ToolPath(#[from] ToolPathError),
    /// The process could not be run.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The tool exited with a non-zero code.
    #[error("'{command_line}' exited with code {code}.")]
    NonZeroExit { command_line: String, code: i32 },
    /// The run was stopped by the timeout or the token.
    #[error("'{command_line}' was cancelled before it finished.")]
    Cancelled { command_line: String },
}

/// Per-run settings, usually derived from [`RunnerConfig`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Kills the tool after this long.
    pub timeout: Option<Duration>,
    /// Capture standard output lines.
    pub capture_stdout: bool,
    /// Capture standard error lines.
    pub capture_stderr: bool,
    /// Log the redacted command line before launching.
    pub log_invocation: bool,
    /// Log every captured line.
    pub log_output: bool,
    /// Directory the tool is started in.
    pub working_directory: Option<PathBuf>,
    /// Which format to render with.
    pub variant: FormatVariant,
    /// Executable name to path overrides.
    pub tool_paths: HashMap<String, PathBuf>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
    /// Stops the run once set.
    pub cancellation: Option<CancellationToken>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_execution(&RunnerConfig::default(), HashMap::new())
    }
}

impl RunSettings {
    /// Settings from a loaded configuration.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_execution(config, config.tool_overrides()?))
    }

    fn from_execution(config: &RunnerConfig, tool_paths: HashMap<String, PathBuf>) -> Self {
        let execution = &config.execution;
        Self {
            timeout: execution.timeout_secs.map(Duration::from_secs),
            capture_stdout: execution.capture_stdout,
            capture_stderr: execution.capture_stderr,
            log_invocation: execution.log_invocation,
            log_output: execution.log_output,
            working_directory: execution.working_directory.clone(),
            variant: FormatVariant::Primary,
            tool_paths,
            env: HashMap::new(),
            cancellation: None,
        }
    }
}

/// The result of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// The argument string with secret values redacted.
    pub command_line: String,
    /// The resolved executable.
    pub tool_path: PathBuf,
    /// What the process did.
    pub outcome: ProcessOutcome,
}

impl ToolResult {
    /// Turns cancellation and non-zero exits into errors.
    pub fn ensure_success(&self) -> Result<&Self, ToolError> {
        if self.outcome.cancelled {
            return Err(ToolError::Cancelled {
                command_line: self.command_line.clone(),
            });
        }
        match self.outcome.exit_code {
            Some(0) => Ok(self),
            code => Err(ToolError::NonZeroExit {
                command_line: self.command_line.clone(),
                // A signal-terminated process has no code of its own.
                code: code.unwrap_or(1),
            }),
        }
    }
}

/// Runs the command bound to `T` in `registry`.
pub async fn run_tool<T: OptionSet>(
    registry: &CommandRegistry,
    options: &T,
    settings: &RunSettings,
) -> Result<ToolResult, ToolError> {
    run_tool_with(registry, options, settings, |_| {}).await
}

/// Like [`run_tool`], handing every output line to `on_event` as it arrives.
pub async fn run_tool_with<T: OptionSet>(
    registry: &CommandRegistry,
    options: &T,
    settings: &RunSettings,
    on_event: impl FnMut(&OutputEvent),
) -> Result<ToolResult, ToolError> {
    let binding = registry.resolve::<T>()?;
    run_binding(&binding, T::schema(), options.store(), settings, on_event).await
}

/// Runs a manifest-described command with a store of assigned options.
pub async fn run_manifest(
    manifest: &ToolManifest,
    store: &OptionStore,
    settings: &RunSettings,
) -> Result<ToolResult, ToolError> {
    run_manifest_with(manifest, store, settings, |_| {}).await
}

/// Like [`run_manifest`], handing every output line to `on_event`.
pub async fn run_manifest_with(
    manifest: &ToolManifest,
    store: &OptionStore,
    settings: &RunSettings,
    on_event: impl FnMut(&OutputEvent),
) -> Result<ToolResult, ToolError> {
    let schema = manifest.schema()?;
    run_binding(&manifest.binding(), &schema, store, settings, on_event).await
}

async fn run_binding(
    binding: &CommandBinding,
    schema: &Schema,
    store: &OptionStore,
    settings: &RunSettings,
    mut on_event: impl FnMut(&OutputEvent),
) -> Result<ToolResult, ToolError> {
    let render_options = RenderOptions {
        variant: settings.variant,
        redact_secrets: false,
    };
    let tokens = render::render_store(schema, store, render_options)?;
    let shown = render::render_store(
        schema,
        store,
        RenderOptions {
            redact_secrets: true,
            ..render_options
        },
    )?;
    let command_line = binding.command_line(&shown);

    let tool_path = tool_path::resolve_tool_path(&binding.executable, &settings.tool_paths)?;
    if settings.log_invocation {
        log::info!("> {} {}", tool_path.display(), command_line);
    }

    let mut invocation = Invocation::new(&tool_path)
        .args(binding.arguments.iter().cloned())
        .args(tokens)
        .envs(&settings.env)
        .capture_stdout(settings.capture_stdout)
        .capture_stderr(settings.capture_stderr)
        .timeout(settings.timeout);
    if let Some(dir) = &settings.working_directory {
        invocation = invocation.working_directory(dir);
    }
    if let Some(token) = &settings.cancellation {
        invocation = invocation.cancellation(token.clone());
    }

    let log_output = settings.log_output;
    let outcome = invocation
        .run_with(|event| {
            if log_output {
                log_event(event);
            }
            on_event(event);
        })
        .await?;

    if outcome.cancelled {
        log::warn!("'{}' was cancelled.", binding.command_id);
    } else {
        log::debug!("'{}' finished with {:?}", binding.command_id, outcome.exit_code);
    }

    Ok(ToolResult {
        command_line,
        tool_path,
        outcome,
    })
}

fn log_event(event: &OutputEvent) {
    match event.kind {
        OutputKind::Std => log::info!("{}", event.text),
        OutputKind::Err => log::warn!("{}", event.text),
    }
}
