// src/cli/handlers/mod.rs

// One module per CLI action.

/// Helpers shared by the action handlers.
pub mod commons;
/// The `describe` action.
pub mod describe;
/// The `exec` action.
pub mod exec;
/// The `render` action.
pub mod render;
