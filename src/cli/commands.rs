//! CLI commands and argument parsing

use crate::types::SyncMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// openFDA food enforcement connector
#[derive(Parser, Debug)]
#[command(name = "fda-enforcement")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON); loaded before a sync and rewritten at every checkpoint
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the configuration properties
    Spec,

    /// Validate configuration and fetch one record
    Check,

    /// Show the destination table declarations
    Schema,

    /// Run a sync
    Read {
        /// Write messages to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the per-run record budget
        #[arg(long)]
        max_records: Option<u64>,

        /// Override the sync mode (incremental or full)
        #[arg(long)]
        sync_mode: Option<SyncMode>,
    },
}
