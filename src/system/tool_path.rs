//! # Tool Path Resolution
//!
//! Turns the executable name of a command binding into a concrete path.
//! Search order:
//!
//! 1. the `<TOOL>_EXE` environment variable (`dotnet` -> `DOTNET_EXE`),
//! 2. a path override from the `[tools]` table of the configuration,
//! 3. the executable itself when it is already a path to a file,
//! 4. a `PATH` lookup via `which`.

use crate::constants::TOOL_PATH_ENV_SUFFIX;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating a tool executable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ToolPathError {
    /// The tool is on no search path.
    #[error("Tool '{executable}' was not found. Install it, add it to PATH or set {env_var}.")]
    NotFound { executable: String, env_var: String },
    /// An override points at something that is not a file.
    #[error("{origin} points to '{path}', which is not a file.")]
    InvalidOverride { origin: String, path: PathBuf },
}

/// The name of the override variable for `executable`.
pub fn tool_env_var(executable: &str) -> String {
    let stem = Path::new(executable)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| executable.to_string());
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    name.push_str(TOOL_PATH_ENV_SUFFIX);
    name
}

/// Resolves `executable` with the process environment.
pub fn resolve_tool_path(
    executable: &str,
    overrides: &HashMap<String, PathBuf>,
) -> Result<PathBuf, ToolPathError> {
    resolve_tool_path_with(executable, overrides, |name| std::env::var(name).ok())
}

/// Like [`resolve_tool_path`] with an injectable environment lookup.
pub fn resolve_tool_path_with(
    executable: &str,
    overrides: &HashMap<String, PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, ToolPathError> {
    let env_var = tool_env_var(executable);

    if let Some(value) = env(&env_var).filter(|v| !v.trim().is_empty()) {
        log::debug!("Using {} = {}", env_var, value);
        return existing_file(PathBuf::from(value), env_var);
    }

    if let Some(path) = overrides.get(executable) {
        log::debug!("Using configured path for '{}': {}", executable, path.display());
        return existing_file(path.clone(), format!("[tools].{}", executable));
    }

    let path = Path::new(executable);
    if path.components().count() > 1 || path.is_absolute() {
        return if path.is_file() {
            Ok(dunce::simplified(path).to_path_buf())
        } else {
            Err(ToolPathError::NotFound {
                executable: executable.to_string(),
                env_var,
            })
        };
    }

    which::which(executable).map_err(|e| {
        log::debug!("PATH lookup for '{}' failed: {}", executable, e);
        ToolPathError::NotFound {
            executable: executable.to_string(),
            env_var,
        }
    })
}

fn existing_file(path: PathBuf, origin: String) -> Result<PathBuf, ToolPathError> {
    if path.is_file() {
        Ok(dunce::simplified(&path).to_path_buf())
    } else {
        Err(ToolPathError::InvalidOverride { origin, path })
    }
}
