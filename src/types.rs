//! Common types used throughout the ClickUp source
//!
//! This module contains shared type definitions, type aliases,
//! and small serde helpers used across multiple modules.

use crate::error::Result;
use futures::stream::BoxStream;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Lazily produced, single-consumption sequence of records
pub type RecordStream<'a, T> = BoxStream<'a, Result<T>>;

// ============================================================================
// Log Level
// ============================================================================

/// Log level for connector messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// ============================================================================
// Identifiers
// ============================================================================

/// Deserialize an opaque identifier that the API may send as a string or a number
pub fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// Like [`deserialize_id`], for optional identifiers
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        parent: Option<String>,
    }

    #[test]
    fn test_deserialize_id_accepts_strings_and_numbers() {
        let h: Holder = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(h.id, "abc");
        assert!(h.parent.is_none());

        let h: Holder = serde_json::from_str(r#"{"id": 9011, "parent": 12}"#).unwrap();
        assert_eq!(h.id, "9011");
        assert_eq!(h.parent.as_deref(), Some("12"));

        let h: Holder = serde_json::from_str(r#"{"id": "1", "parent": null}"#).unwrap();
        assert!(h.parent.is_none());
    }

    #[test]
    fn test_log_level_serializes_uppercase() {
        let json = serde_json::to_string(&LogLevel::Info).unwrap();
        assert_eq!(json, "\"INFO\"");
    }
}
