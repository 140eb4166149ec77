// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_self)]

//! # openFDA Food Enforcement Connector
//!
//! Pulls food recall enforcement reports from the openFDA API and upserts
//! them, flattened, into a destination table keyed by `recall_number`.
//!
//! ## Features
//!
//! - **Paced Fetching**: 240 requests/minute token bucket with retry and backoff
//! - **Offset Pagination**: `skip`/`limit` pages bounded by a per-run record budget
//! - **Flattening**: Nested JSON becomes one level of `_`-joined columns
//! - **Incremental Sync**: Resumes from the largest checkpointed `report_date`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fda_enforcement::{ConnectorConfig, FdaEnforcementConnector, MemoryDestination, SyncState};
//!
//! #[tokio::main]
//! async fn main() -> fda_enforcement::Result<()> {
//!     let config = ConnectorConfig::from_json(r#"{"api_key": "..."}"#)?;
//!     let connector = FdaEnforcementConnector::new(config);
//!
//!     let mut destination = MemoryDestination::new();
//!     let (state, stats) = connector.read(&SyncState::new(), &mut destination).await?;
//!     println!("synced {} records up to {:?}", stats.records_synced, state.last_sync_date);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Connector Interface                      │
//! │   spec() → properties   check() → status   schema() → tables  │
//! │   read(state, destination) → state                            │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬────────────┬────┴───────┬────────────┬───────────┐
//! │   HTTP    │  Paginate  │   Fetch    │  Flatten   │   State   │
//! ├───────────┼────────────┼────────────┼────────────┼───────────┤
//! │ Backoff   │ Offset     │ openFDA    │ Key paths  │ Cursor    │
//! │ Rate limit│ Budget     │ 404 = none │ Arrays     │ Atomic    │
//! └───────────┴────────────┴────────────┴────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Typed view over enforcement records
pub mod models;

/// HTTP client with retry and rate limiting
pub mod http;

/// Offset pagination with a record budget
pub mod pagination;

/// openFDA page fetching
pub mod fetch;

/// JSON flattening
pub mod flatten;

/// Sync state and checkpointing
pub mod state;

/// Upsert/checkpoint destinations
pub mod sink;

/// Table declarations
pub mod schema;

/// Main execution engine
pub mod engine;

/// Connector configuration
pub mod config;

/// Connector facade
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ConnectorConfig;
pub use connector::{CheckResult, FdaEnforcementConnector};
pub use engine::{SyncConfig, SyncEngine, SyncStats};
pub use flatten::{FlatRecord, Flattener};
pub use sink::{Destination, JsonLinesDestination, MemoryDestination};
pub use state::{StateManager, SyncState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
