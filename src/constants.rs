// src/constants.rs

/// The name of the runner configuration file looked up in the current directory.
pub const PROJECT_CONFIG_FILENAME: &str = "toolwire.toml";

/// The directory holding the user-wide configuration (inside the OS config dir).
pub const CONFIG_DIR_NAME: &str = "toolwire";

/// The name of the user-wide configuration file (inside `CONFIG_DIR_NAME`).
pub const GLOBAL_CONFIG_FILENAME: &str = "config.toml";

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "TOOLWIRE_CONFIG";

/// Suffix of the per-tool path override variable (`DOTNET_EXE`).
pub const TOOL_PATH_ENV_SUFFIX: &str = "_EXE";

/// Replaces secret option values in logged command lines.
pub const REDACTED: &str = "[REDACTED]";

/// Polling interval for cancellation checks, in milliseconds.
pub const CANCELLATION_POLL_MS: u64 = 100;

/// Exit code used when the user interrupts a run with Ctrl+C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
