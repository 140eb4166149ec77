//! Record flattening module
//!
//! Converts nested enforcement records into single-level rows whose keys are
//! the joined paths of the original fields.
//!
//! # Overview
//!
//! - `Flattener` - Path-joining flattener with a configurable separator
//! - `ArrayMode` - How sequences are rendered (JSON text or indexed keys)
//! - `FlatRecord` - The flattened row handed to the destination

mod flattener;

pub use flattener::{
    attach_sync_metadata, ArrayMode, FlatRecord, Flattener, DEFAULT_SEPARATOR, DELETED_COLUMN,
    SYNCED_COLUMN,
};

#[cfg(test)]
mod tests;
