//! Destination types

use crate::error::Result;
use crate::flatten::FlatRecord;
use crate::state::SyncState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Capability the sync engine writes to
///
/// `upsert` must be idempotent on the table's primary key. A failing
/// `checkpoint` is fatal for the run.
#[async_trait]
pub trait Destination: Send {
    /// Insert or replace one row
    async fn upsert(&mut self, table: &str, record: FlatRecord) -> Result<()>;

    /// Persist the resumption state
    async fn checkpoint(&mut self, state: &SyncState) -> Result<()>;
}

/// Messages written by [`super::JsonLinesDestination`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// A flattened row for `table`
    Upsert { table: String, data: FlatRecord },
    /// A state checkpoint
    Checkpoint { state: SyncState },
}

impl Message {
    /// Create an upsert message
    pub fn upsert(table: impl Into<String>, data: FlatRecord) -> Self {
        Self::Upsert {
            table: table.into(),
            data,
        }
    }

    /// Create a checkpoint message
    pub fn checkpoint(state: SyncState) -> Self {
        Self::Checkpoint { state }
    }
}
