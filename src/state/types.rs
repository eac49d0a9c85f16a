//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs. Incremental
//! streams keep one cursor per partition (for tasks, per list ID), expressed
//! as epoch milliseconds.

use crate::types::deserialize_opt_id;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Complete state for the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Cursor of a partition, if one was recorded
    pub fn partition_cursor(&self, stream: &str, partition_id: &str) -> Option<i64> {
        self.get_stream(stream)?.get_partition(partition_id)?.cursor
    }

    /// Move a partition cursor forward; returns whether it changed
    pub fn advance_partition_cursor(&mut self, stream: &str, partition_id: &str, cursor: i64) -> bool {
        self.get_stream_mut(stream)
            .get_partition_mut(partition_id)
            .advance(cursor)
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// Per-partition state
    #[serde(default)]
    pub partitions: BTreeMap<String, PartitionState>,
}

impl StreamState {
    /// Get partition state
    pub fn get_partition(&self, partition_id: &str) -> Option<&PartitionState> {
        self.partitions.get(partition_id)
    }

    /// Get mutable partition state, creating if needed
    pub fn get_partition_mut(&mut self, partition_id: &str) -> &mut PartitionState {
        self.partitions.entry(partition_id.to_string()).or_default()
    }
}

/// State for a single partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Highest `date_updated` seen, in epoch milliseconds
    #[serde(
        default,
        deserialize_with = "deserialize_cursor",
        skip_serializing_if = "Option::is_none"
    )]
    pub cursor: Option<i64>,
}

impl PartitionState {
    /// Cursors never move backwards
    pub fn advance(&mut self, cursor: i64) -> bool {
        if self.cursor.is_some_and(|current| current >= cursor) {
            return false;
        }
        self.cursor = Some(cursor);
        true
    }
}

/// Accept the cursor as a number or a numeric string
fn deserialize_cursor<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_opt_id(deserializer)?
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid cursor '{raw}'")))
        })
        .transpose()
}
