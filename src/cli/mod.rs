//! CLI module
//!
//! Command-line interface for running the connector.
//!
//! # Commands
//!
//! - `spec` - Print the configuration properties
//! - `check` - Validate configuration and fetch one record
//! - `schema` - Print the table declarations
//! - `read` - Run a sync, writing JSON-lines messages

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
