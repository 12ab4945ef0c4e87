//! # System Interaction Layer
//!
//! The boundary between option sets and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns a process, drains stdout and stderr concurrently into one
//!   ordered event sequence and enforces timeouts and cancellation (`Ctrl+C`).
//! - **`tool_path`**: resolves an executable name through environment overrides, the
//!   configuration and `PATH`.
//! - **`tool_runner`**: the end-to-end flow from a bound option set to a finished process.

/// Process launching with timeout and cancellation.
pub mod executor;
/// Tool executable lookup.
pub mod tool_path;
/// Rendering plus launching for bound option sets.
pub mod tool_runner;
