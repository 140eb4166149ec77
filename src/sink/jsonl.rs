//! JSON-lines destination
//!
//! Writes one [`Message`] per line. Checkpoints flush the writer and, when a
//! [`StateManager`] is attached, are also persisted through it.

use super::types::{Destination, Message};
use crate::error::{Error, Result};
use crate::flatten::FlatRecord;
use crate::state::{StateManager, SyncState};
use async_trait::async_trait;
use std::io::Write;

/// Streams messages to any writer
pub struct JsonLinesDestination<W: Write + Send> {
    writer: W,
    state_manager: Option<StateManager>,
    lines: u64,
}

impl<W: Write + Send> JsonLinesDestination<W> {
    /// Write messages to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state_manager: None,
            lines: 0,
        }
    }

    /// Also persist every checkpoint through `manager`
    #[must_use]
    pub fn with_state_manager(mut self, manager: StateManager) -> Self {
        self.state_manager = Some(manager);
        self
    }

    /// Lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Consume the destination, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_message(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)
            .map_err(|e| Error::sink(format!("failed to write message: {e}")))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| Error::sink(format!("failed to write message: {e}")))?;
        self.lines += 1;
        Ok(())
    }
}

impl<W: Write + Send> std::fmt::Debug for JsonLinesDestination<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesDestination")
            .field("state_manager", &self.state_manager)
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<W: Write + Send> Destination for JsonLinesDestination<W> {
    async fn upsert(&mut self, table: &str, record: FlatRecord) -> Result<()> {
        self.write_message(&Message::upsert(table, record))
    }

    async fn checkpoint(&mut self, state: &SyncState) -> Result<()> {
        self.write_message(&Message::checkpoint(state.clone()))?;
        self.writer
            .flush()
            .map_err(|e| Error::sink(format!("failed to flush output: {e}")))?;

        if let Some(ref manager) = self.state_manager {
            manager.checkpoint(state).await?;
        }
        Ok(())
    }
}
