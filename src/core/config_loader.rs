//! # Config Loader
//!
//! Loads the runner configuration (`toolwire.toml`). The first file found wins:
//!
//! 1. an explicit path (`--config`) or the `TOOLWIRE_CONFIG` environment variable,
//! 2. `toolwire.toml` in the current directory,
//! 3. `toolwire/config.toml` under the user configuration directory.
//!
//! With no file at all the defaults apply. An explicit path that does not
//! exist is an error; the implicit locations are simply skipped.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, GLOBAL_CONFIG_FILENAME, PROJECT_CONFIG_FILENAME};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating or reading `toolwire.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Could not read configuration file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML.
    #[error("Configuration file '{path}' is not valid TOML")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// A `[tools]` path could not be expanded.
    #[error("Could not expand tool path '{value}' for '{tool}': {reason}")]
    Expand {
        tool: String,
        value: String,
        reason: String,
    },
}

/// The contents of `toolwire.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Defaults for every tool run.
    pub execution: ExecutionConfig,
    /// Executable name -> path override.
    pub tools: HashMap<String, String>,
}

/// The `[execution]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Kill the tool after this many seconds.
    pub timeout_secs: Option<u64>,
    /// Capture standard output lines.
    pub capture_stdout: bool,
    /// Capture standard error lines.
    pub capture_stderr: bool,
    /// Log the redacted command line before launching.
    pub log_invocation: bool,
    /// Log every captured line as it arrives.
    pub log_output: bool,
    /// Directory the tool is started in.
    pub working_directory: Option<PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            capture_stdout: true,
            capture_stderr: true,
            log_invocation: true,
            log_output: true,
            working_directory: None,
        }
    }
}

impl RunnerConfig {
    /// Tool path overrides with `~` and `$VAR` expanded.
    pub fn tool_overrides(&self) -> Result<HashMap<String, PathBuf>, ConfigError> {
        self.tools
            .iter()
            .map(|(tool, value)| {
                let expanded = shellexpand::full(value).map_err(|e| ConfigError::Expand {
                    tool: tool.clone(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
                Ok((tool.clone(), PathBuf::from(expanded.as_ref())))
            })
            .collect()
    }
}

/// Loads the configuration following the lookup order above.
pub fn load_config(explicit: Option<&Path>) -> Result<RunnerConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let cwd = std::env::current_dir().ok();
    let user_dir = dirs::config_dir();
    match find_config_file(explicit, from_env.as_deref(), cwd.as_deref(), user_dir.as_deref()) {
        Some(path) => load_config_from(&path),
        None => {
            log::debug!("No configuration file found, using defaults.");
            Ok(RunnerConfig::default())
        }
    }
}

/// Picks the file to load. Explicit and environment paths are returned even
/// when missing so the caller gets a read error instead of silent defaults.
fn find_config_file(
    explicit: Option<&Path>,
    from_env: Option<&Path>,
    cwd: Option<&Path>,
    user_config_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit.or(from_env) {
        return Some(path.to_path_buf());
    }
    let local = cwd.map(|dir| dir.join(PROJECT_CONFIG_FILENAME));
    let global = user_config_dir.map(|dir| dir.join(CONFIG_DIR_NAME).join(GLOBAL_CONFIG_FILENAME));
    [local, global].into_iter().flatten().find(|p| p.is_file())
}

/// Reads and parses a configuration file.
pub fn load_config_from(path: &Path) -> Result<RunnerConfig, ConfigError> {
    log::debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
