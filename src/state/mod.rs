//! State management module
//!
//! Handles the sync cursor, checkpointing, and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `SyncState` - The persisted `{last_sync_date, total_processed, last_cursor}` object
//! - `advance` - Moves the date cursor forward over a batch of raw records
//! - `StateManager` - In-memory or file-based state persistence

mod cursor;
mod manager;
mod types;

pub use cursor::{advance, max_report_date};
pub use manager::StateManager;
pub use types::SyncState;

#[cfg(test)]
mod manager_tests;
