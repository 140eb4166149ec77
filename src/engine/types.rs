//! Engine types
//!
//! Run configuration and statistics for the sync engine.

use crate::config::ConnectorConfig;
use crate::pagination::{StopReason, MAX_PAGE_SIZE, MAX_SKIP};
use crate::types::SyncMode;

/// Configuration for a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Records per request
    pub limit: u32,
    /// Records fetched per run
    pub max_records: u64,
    /// Whether to resume from the prior cursor
    pub sync_mode: SyncMode,
    /// Largest offset the source accepts
    pub max_skip: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            limit: MAX_PAGE_SIZE,
            max_records: 10_000,
            sync_mode: SyncMode::Incremental,
            max_skip: MAX_SKIP,
        }
    }
}

impl From<&ConnectorConfig> for SyncConfig {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            limit: config.limit,
            max_records: config.max_records,
            sync_mode: config.sync_mode,
            ..Self::default()
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: u64) -> Self {
        self.max_records = max;
        self
    }

    /// Set sync mode
    #[must_use]
    pub fn with_sync_mode(mut self, mode: SyncMode) -> Self {
        self.sync_mode = mode;
        self
    }

    /// Set the offset ceiling
    #[must_use]
    pub fn with_max_skip(mut self, max_skip: u64) -> Self {
        self.max_skip = max_skip;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records upserted
    pub records_synced: u64,
    /// Malformed records skipped
    pub records_skipped: u64,
    /// Pages fetched
    pub pages_fetched: u64,
    /// Checkpoints written
    pub checkpoints: u64,
    /// Why the run stopped (unset while running or after a fatal error)
    pub stop_reason: Option<StopReason>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an upserted record
    pub fn add_record(&mut self) {
        self.records_synced += 1;
    }

    /// Count a skipped record
    pub fn add_skipped(&mut self) {
        self.records_skipped += 1;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Count a checkpoint
    pub fn add_checkpoint(&mut self) {
        self.checkpoints += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
