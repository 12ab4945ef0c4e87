//! Typed option sets for command-line tools. Options render into argument
//! tokens, and the tool runs with a timeout and a cancellation token.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared flag that asks a running process to stop.
pub type CancellationToken = Arc<AtomicBool>;

/// Command-line front end.
pub mod cli;
/// Constants shared across the crate.
pub mod constants;
/// Option sets, rendering and command bindings.
pub mod core;
/// Plain data types.
pub mod models;
/// Process launching and tool runs.
pub mod system;
