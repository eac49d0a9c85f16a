//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::connector::{ClickUpSource, Connector, Message};
use crate::error::{Error, Result};
use crate::state::StateManager;
use crate::streams::StreamName;
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
    connector: Arc<dyn Connector>,
}

impl Runner {
    /// Create a runner for the ClickUp source
    pub fn new(cli: Cli) -> Self {
        Self::with_connector(cli, Arc::new(ClickUpSource::new()))
    }

    /// Create a runner for any connector
    pub fn with_connector(cli: Cli, connector: Arc<dyn Connector>) -> Self {
        Self { cli, connector }
    }

    /// Run the CLI command, writing messages to stdout
    pub async fn run(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        self.run_to(&mut stdout).await
    }

    /// Run the CLI command, writing messages to `out`
    pub async fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check(out).await,
            Commands::Streams => self.streams(out),
            Commands::Read { streams } => self.read(out, streams.as_deref()).await,
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<Value> {
        if let Some(json_str) = &self.cli.config_json {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            return serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        Err(Error::config(
            "No configuration provided (use --config or --config-json)",
        ))
    }

    /// Load state; inline JSON takes precedence over the file
    fn load_state(&self) -> Result<StateManager> {
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Check connection
    async fn check<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.load_config()?;
        let result = self.connector.check(&config).await;
        self.output_message(out, &Message::ConnectionStatus(result).to_json())
    }

    /// List available streams
    fn streams<W: Write>(&self, out: &mut W) -> Result<()> {
        let names: Vec<&str> = self
            .connector
            .streams()
            .into_iter()
            .map(StreamName::as_str)
            .collect();

        self.output_message(
            out,
            &json!({
                "type": "STREAMS",
                "streams": names
            }),
        )
    }

    /// Read the selected streams
    async fn read<W: Write>(&self, out: &mut W, streams: Option<&str>) -> Result<()> {
        let selection = StreamName::parse_list(streams.unwrap_or_default())?;
        let config = self.load_config()?;
        let state = self.load_state()?;
        let sync_start = Instant::now();

        info!(
            "Reading streams: {}",
            selection
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut records: BTreeMap<&'static str, u64> =
            selection.iter().map(|s| (s.as_str(), 0)).collect();
        let mut messages = self
            .connector
            .read(&config, &selection, state.clone())
            .await?;

        while let Some(message) = messages.next().await {
            match message {
                Ok(message) => {
                    if let Message::Record { stream, .. } = &message {
                        *records.entry(stream.as_str()).or_default() += 1;
                    }
                    self.output_message(out, &message.to_json())?;
                }
                Err(e) => {
                    error!("Sync failed: {e}");
                    self.output_message(out, &Message::error(e.to_string()).to_json())?;
                    return Err(e);
                }
            }
        }

        // Final state, so callers without a state file can capture it
        let final_state = state.checkpoint().await?;
        self.output_message(out, &Message::state(final_state).to_json())?;

        let total_records: u64 = records.values().sum();
        self.output_message(
            out,
            &json!({
                "type": "SYNC_SUMMARY",
                "summary": {
                    "status": "SUCCEEDED",
                    "total_records": total_records,
                    "duration_ms": sync_start.elapsed().as_millis() as u64,
                    "state_file": self.cli.state.as_ref().map(|p| p.to_string_lossy().to_string()),
                    "streams": records
                }
            }),
        )
    }

    /// Output a message
    fn output_message<W: Write>(&self, out: &mut W, msg: &Value) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
