//! Schema declaration module
//!
//! Declares the destination tables and their primary keys. Column types are
//! left to the host, which infers them from the upserted rows.

mod types;

pub use types::{schema, TableDefinition};
