//! Connector trait and the ClickUp source
//!
//! A connector validates its configuration, checks connectivity and turns a
//! selection of streams into a sequence of messages (records, state
//! checkpoints, logs) that the CLI prints as JSON lines.

use crate::clickup::ClickUp;
use crate::config::ClickUpConfig;
use crate::error::Result;
use crate::state::{State, StateManager};
use crate::streams::{StreamName, StreamReader};
use crate::types::{JsonValue, LogLevel, RecordStream};
use async_stream::try_stream;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
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
// Messages
// ============================================================================

/// Messages emitted by the connector
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// One record of a stream
    Record {
        stream: StreamName,
        data: JsonValue,
        emitted_at: DateTime<Utc>,
    },

    /// State checkpoint
    State(State),

    /// Log message
    Log { level: LogLevel, message: String },

    /// Outcome of a connection check
    ConnectionStatus(CheckResult),
}

impl Message {
    /// Create a record message
    pub fn record(stream: StreamName, data: JsonValue) -> Self {
        Self::Record {
            stream,
            data,
            emitted_at: Utc::now(),
        }
    }

    /// Create a state message
    pub fn state(state: State) -> Self {
        Self::State(state)
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log message
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create an error log message
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Wire representation, one object per output line
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Record {
                stream,
                data,
                emitted_at,
            } => json!({
                "type": "RECORD",
                "record": {
                    "stream": stream.as_str(),
                    "data": data,
                    "emitted_at": emitted_at.timestamp_millis()
                }
            }),
            Self::State(state) => json!({
                "type": "STATE",
                "state": {"data": state}
            }),
            Self::Log { level, message } => json!({
                "type": "LOG",
                "log": {"level": level, "message": message}
            }),
            Self::ConnectionStatus(result) => json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": if result.success { "SUCCEEDED" } else { "FAILED" },
                    "message": result.message
                }
            }),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Type alias for the message stream returned by read()
pub type MessageStream = RecordStream<'static, Message>;

/// Core trait of a source connector
#[async_trait]
pub trait Connector: Send + Sync {
    /// Tests if credentials and configuration are valid
    async fn check(&self, config: &JsonValue) -> CheckResult;

    /// Streams this source can produce
    fn streams(&self) -> Vec<StreamName>;

    /// Reads the selected streams, in order.
    ///
    /// Cursors are taken from and checkpointed into `state`.
    async fn read(
        &self,
        config: &JsonValue,
        streams: &[StreamName],
        state: StateManager,
    ) -> Result<MessageStream>;
}

// ============================================================================
// ClickUp Source
// ============================================================================

/// Source connector for the ClickUp API
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickUpSource;

impl ClickUpSource {
    /// Create the source
    pub fn new() -> Self {
        Self
    }

    fn client(config: &JsonValue) -> Result<(ClickUpConfig, ClickUp)> {
        let config = ClickUpConfig::from_value(config.clone())?;
        let client = ClickUp::new(&config)?;
        Ok((config, client))
    }
}

#[async_trait]
impl Connector for ClickUpSource {
    async fn check(&self, config: &JsonValue) -> CheckResult {
        let result = match Self::client(config) {
            Ok((_, client)) => client.check_connection().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("Connection check succeeded");
                CheckResult::success()
            }
            Err(e) => {
                warn!("Connection check failed: {e}");
                CheckResult::failure(e.to_string())
            }
        }
    }

    fn streams(&self) -> Vec<StreamName> {
        StreamName::ALL.to_vec()
    }

    async fn read(
        &self,
        config: &JsonValue,
        streams: &[StreamName],
        state: StateManager,
    ) -> Result<MessageStream> {
        let (config, client) = Self::client(config)?;
        let reader = StreamReader::new(Arc::new(client), Arc::new(config), state);
        let streams = streams.to_vec();

        // The first failing stream ends the whole read
        let messages: MessageStream = Box::pin(try_stream! {
            for name in streams {
                let mut stream = reader.read(name);
                while let Some(message) = stream.next().await {
                    yield message?;
                }
            }
        });
        Ok(messages)
    }
}
