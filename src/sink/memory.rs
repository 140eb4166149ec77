//! In-memory destination

use super::types::Destination;
use crate::error::{Error, Result};
use crate::flatten::FlatRecord;
use crate::models::PRIMARY_KEY;
use crate::state::SyncState;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Rows keyed by primary key, per table
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    tables: BTreeMap<String, BTreeMap<String, FlatRecord>>,
    checkpoints: Vec<SyncState>,
    upserts: u64,
}

impl MemoryDestination {
    /// Create an empty destination
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of `table`, keyed by primary key
    pub fn table(&self, table: &str) -> Option<&BTreeMap<String, FlatRecord>> {
        self.tables.get(table)
    }

    /// Number of rows currently in `table`
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, BTreeMap::len)
    }

    /// Look up one row
    pub fn get(&self, table: &str, key: &str) -> Option<&FlatRecord> {
        self.tables.get(table)?.get(key)
    }

    /// Every checkpoint received, oldest first
    pub fn checkpoints(&self) -> &[SyncState] {
        &self.checkpoints
    }

    /// Most recent checkpoint
    pub fn last_checkpoint(&self) -> Option<&SyncState> {
        self.checkpoints.last()
    }

    /// Upsert calls received, including overwrites
    pub fn upsert_count(&self) -> u64 {
        self.upserts
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn upsert(&mut self, table: &str, record: FlatRecord) -> Result<()> {
        let key = match record.get(PRIMARY_KEY) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => {
                return Err(Error::sink(format!(
                    "record for '{table}' has no '{PRIMARY_KEY}'"
                )))
            }
            Some(other) => other.to_string(),
        };

        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key, record);
        self.upserts += 1;
        Ok(())
    }

    async fn checkpoint(&mut self, state: &SyncState) -> Result<()> {
        self.checkpoints.push(state.clone());
        Ok(())
    }
}
