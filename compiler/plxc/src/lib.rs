//! The `plx` command-line tool.
//!
//! Commands live in [`commands`]; `main.rs` only parses the command word
//! and reports the outcome. Every command takes its output writer as a
//! parameter so it can be exercised without a terminal.

pub mod commands;
pub mod config;
pub mod error;
mod tracing_setup;

pub use config::CliConfig;
pub use error::CliError;
pub use tracing_setup::init_tracing;
