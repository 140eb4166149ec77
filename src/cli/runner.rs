//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ConnectorConfig;
use crate::connector::FdaEnforcementConnector;
use crate::error::{Error, Result, ResultExt};
use crate::sink::JsonLinesDestination;
use crate::state::StateManager;
use crate::types::SyncMode;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Schema => self.schema(),
            Commands::Read {
                output,
                max_records,
                sync_mode,
            } => {
                self.read(output.as_deref(), *max_records, *sync_mode)
                    .await
            }
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<ConnectorConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return ConnectorConfig::from_json(json_str);
        }

        if let Some(path) = &self.cli.config {
            return ConnectorConfig::from_file(path);
        }

        Err(Error::config(
            "No configuration given (use -C <file> or --config-json)",
        ))
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": FdaEnforcementConnector::spec(),
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let connector = FdaEnforcementConnector::new(config);
        let result = connector.check().await?;

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": if result.success { "SUCCEEDED" } else { "FAILED" },
                "message": result.message,
            }
        }));

        Ok(())
    }

    /// Show table declarations
    fn schema(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SCHEMA",
            "tables": FdaEnforcementConnector::schema(),
        }));
        Ok(())
    }

    /// Run a sync
    async fn read(
        &self,
        output: Option<&Path>,
        max_records: Option<u64>,
        sync_mode: Option<SyncMode>,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(max_records) = max_records {
            config.max_records = max_records;
        }
        if let Some(sync_mode) = sync_mode {
            config.sync_mode = sync_mode;
        }
        let config = config.validated()?;

        let state_manager = self.load_state()?;
        let prior = state_manager.get().await;

        let writer: Box<dyn Write + Send> = match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(std::io::stdout())),
        };

        let mut destination = JsonLinesDestination::new(writer);
        if !state_manager.is_in_memory() {
            destination = destination.with_state_manager(state_manager.clone());
        }

        let connector = FdaEnforcementConnector::new(config);
        let (state, stats) = connector.read(&prior, &mut destination).await?;

        info!(
            records = stats.records_synced,
            skipped = stats.records_skipped,
            pages = stats.pages_fetched,
            lines = destination.lines_written(),
            last_sync_date = ?state.last_sync_date,
            "Read finished"
        );

        Ok(())
    }

    /// Print one message to stdout
    fn output_message(&self, msg: &Value) {
        println!("{msg}");
    }
}
