//! Destination module
//!
//! The host side of a sync: where flattened records are upserted and where
//! checkpoints are stored.
//!
//! # Overview
//!
//! - `Destination` - The upsert/checkpoint capability the engine writes to
//! - `MemoryDestination` - Keyed in-memory tables, for tests and embedders
//! - `JsonLinesDestination` - `UPSERT` / `CHECKPOINT` messages as JSON lines

mod jsonl;
mod memory;
mod types;

pub use jsonl::JsonLinesDestination;
pub use memory::MemoryDestination;
pub use types::{Destination, Message};
