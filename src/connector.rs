//! Connector facade
//!
//! Ties configuration, fetcher, engine and schema together behind the four
//! operations a host calls: `spec`, `check`, `schema` and `read`.

use crate::config::{ConnectorConfig, SpecConfig};
use crate::engine::{SyncConfig, SyncEngine, SyncStats};
use crate::error::Result;
use crate::fetch::{EnforcementFetcher, PageSource};
use crate::pagination::PageRequest;
use crate::schema::{schema, TableDefinition};
use crate::sink::Destination;
use crate::state::SyncState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Detail about the outcome
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector
// ============================================================================

/// openFDA food enforcement connector
#[derive(Debug, Clone)]
pub struct FdaEnforcementConnector {
    config: ConnectorConfig,
}

impl FdaEnforcementConnector {
    /// Create a connector from a validated configuration
    pub fn new(config: ConnectorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Accepted configuration properties
    pub fn spec() -> SpecConfig {
        ConnectorConfig::spec()
    }

    /// Tables this connector writes
    pub fn schema() -> Vec<TableDefinition> {
        schema()
    }

    /// Fetch a single record to verify the key and endpoint
    pub async fn check(&self) -> Result<CheckResult> {
        let fetcher = EnforcementFetcher::from_config(&self.config)?;

        match fetcher.fetch(None, PageRequest::new(0, 1)).await {
            Ok(page) => {
                let detail = match page.total {
                    Some(total) => format!("Connection successful, {total} records available"),
                    None => "Connection successful".to_string(),
                };
                info!("{detail}");
                Ok(CheckResult::success(detail))
            }
            Err(e) => {
                warn!(error = %e, "Connection check failed");
                Ok(CheckResult::failure(format!("Connection failed: {e}")))
            }
        }
    }

    /// Run one sync from `prior` into `destination`
    pub async fn read(
        &self,
        prior: &SyncState,
        destination: &mut dyn Destination,
    ) -> Result<(SyncState, SyncStats)> {
        let fetcher = EnforcementFetcher::from_config(&self.config)?;
        let mut engine = SyncEngine::new(fetcher, self.config.flattener())
            .with_config(SyncConfig::from(&self.config));

        let state = engine.run(prior, destination).await?;
        Ok((state, engine.stats().clone()))
    }
}
