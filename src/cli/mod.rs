//! CLI command handlers.
//!
//! `serve` runs the controller; the other commands are headless helpers
//! for setting up and scripting it.

pub mod check;
pub mod common;
pub mod config;
pub mod serve;
pub mod sign;

// Re-export types used by main.rs and tests
pub use check::CheckArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use serve::ServeArgs;
pub use sign::SignArgs;
