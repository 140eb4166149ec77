//! Execution engine module
//!
//! Main read loop: drives the page source up to the run's record budget,
//! flattens every record into the destination, and checkpoints the cursor
//! after each page.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Orchestrates one sync run
//! - `SyncConfig` - Page size, budget and mode for a run
//! - `SyncStats` - Counters reported at the end of a run

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::error::Result;
use crate::fetch::PageSource;
use crate::flatten::{attach_sync_metadata, FlatRecord, Flattener};
use crate::models::{EnforcementRecord, TABLE_NAME};
use crate::pagination::OffsetPaginator;
use crate::sink::Destination;
use crate::state::{advance, SyncState};
use crate::types::{JsonValue, SyncMode};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<S> {
    /// Where pages come from
    source: S,
    /// Turns raw records into rows
    flattener: Flattener,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics of the last run
    stats: SyncStats,
}

impl<S: PageSource> SyncEngine<S> {
    /// Create a new sync engine
    pub fn new(source: S, flattener: Flattener) -> Self {
        Self {
            source,
            flattener,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Get the page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one sync from `prior`, returning the final state.
    ///
    /// The returned state has also been checkpointed to `destination`. On
    /// error the last checkpoint written is the resumption point.
    pub async fn run(
        &mut self,
        prior: &SyncState,
        destination: &mut dyn Destination,
    ) -> Result<SyncState> {
        let start = Instant::now();
        self.stats = SyncStats::new();

        let since = match self.config.sync_mode {
            SyncMode::Incremental => prior.last_sync_date,
            SyncMode::Full => None,
        };

        info!(
            mode = %self.config.sync_mode,
            since = ?since,
            limit = self.config.limit,
            max_records = self.config.max_records,
            "Starting sync"
        );

        let mut paginator = OffsetPaginator::new(self.config.limit, self.config.max_records)
            .with_max_skip(self.config.max_skip);
        // `since` only bounds the query; the cursor itself never moves back,
        // even when a full run re-reads older records.
        let mut state = SyncState {
            last_sync_date: prior.last_sync_date,
            total_processed: prior.total_processed,
            last_cursor: prior.last_cursor,
        };

        while let Some(request) = paginator.next_request() {
            let mut page = self.source.fetch(since, request).await?;
            self.stats.add_page();

            if page.records.len() > request.limit as usize {
                warn!(
                    requested = request.limit,
                    returned = page.records.len(),
                    "Page larger than requested, truncating"
                );
                page.records.truncate(request.limit as usize);
            }

            let synced_at = Utc::now();
            let mut upserted = 0u64;
            let mut valid: Vec<&JsonValue> = Vec::with_capacity(page.records.len());

            for (index, raw) in page.records.iter().enumerate() {
                match self.to_row(raw, synced_at) {
                    Ok(row) => {
                        destination.upsert(TABLE_NAME, row).await?;
                        valid.push(raw);
                        upserted += 1;
                        self.stats.add_record();
                    }
                    Err(e) if e.is_record_level() => {
                        warn!(
                            offset = request.offset + index as u64,
                            error = %e,
                            "Skipping malformed record"
                        );
                        self.stats.add_skipped();
                    }
                    Err(e) => return Err(e),
                }
            }

            paginator.record_page(page.records.len(), page.has_more);

            state = SyncState {
                last_sync_date: advance(state.last_sync_date, valid),
                total_processed: state.total_processed + upserted,
                last_cursor: Some(paginator.offset()),
            };
            destination.checkpoint(&state).await?;
            self.stats.add_checkpoint();

            info!(
                page = self.stats.pages_fetched,
                offset = request.offset,
                returned = page.records.len(),
                upserted,
                total = ?page.total,
                cursor = ?state.last_sync_date,
                "Processed page"
            );
        }

        destination.checkpoint(&state).await?;
        self.stats.add_checkpoint();

        self.stats.stop_reason = paginator.stop_reason();
        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            records = self.stats.records_synced,
            skipped = self.stats.records_skipped,
            pages = self.stats.pages_fetched,
            stop = ?self.stats.stop_reason,
            duration_ms = self.stats.duration_ms,
            "Sync complete"
        );

        Ok(state)
    }

    /// Validate, flatten and stamp one raw record
    fn to_row(&self, raw: &JsonValue, synced_at: DateTime<Utc>) -> Result<FlatRecord> {
        let record = EnforcementRecord::from_value(raw)?;
        debug!(
            recall_number = record.recall_number,
            report_date = ?record.report_date,
            initiated = ?record.recall_initiation_date,
            classification = ?record.classification,
            status = ?record.status,
            "Flattening record"
        );
        if record.report_date.is_none() {
            warn!(
                recall_number = record.recall_number,
                "No parseable report_date, record will not advance the cursor"
            );
        }

        let mut row = self.flattener.flatten(raw)?;
        attach_sync_metadata(&mut row, synced_at)?;
        Ok(row)
    }
}

impl<S> std::fmt::Debug for SyncEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("flattener", &self.flattener)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
