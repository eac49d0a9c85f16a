//! Connector configuration
//!
//! The configuration is supplied as JSON and validated eagerly, before any
//! network activity takes place.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ClickUp REST API v2 endpoint
pub const BASE_API_URL: &str = "https://api.clickup.com/api/v2";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: i64 = 60_000;

/// Default response size ceiling in bytes
pub const DEFAULT_MAX_CONTENT_LENGTH: i64 = 10_000_000;

/// Default number of retries per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default look-back window for the first task sync
pub const DEFAULT_CUTOFF_DAYS: i64 = 90;

// ============================================================================
// Source Config
// ============================================================================

/// User-supplied configuration for the ClickUp source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickUpConfig {
    /// Personal API token, sent verbatim in the `authorization` header
    #[serde(default)]
    pub token: String,

    /// Include archived spaces, folders, lists and tasks
    #[serde(default)]
    pub fetch_archived: bool,

    /// Only fetch tasks updated in the last N days when no cursor is known
    #[serde(default = "default_cutoff_days")]
    pub cutoff_days: i64,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: i64,

    /// Maximum response body size in bytes
    #[serde(default = "default_max_content_length")]
    pub max_content_length: i64,

    /// Maximum retries for throttled or transiently failing requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-side request quota; unlimited when absent
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    /// Upper bound for `retry-after` waits; uncapped when absent
    #[serde(default)]
    pub max_retry_after_secs: Option<u64>,

    /// Restrict traversal to these workspace IDs (all when empty)
    #[serde(default)]
    pub workspaces: Vec<String>,

    /// API endpoint override
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_cutoff_days() -> i64 {
    DEFAULT_CUTOFF_DAYS
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_content_length() -> i64 {
    DEFAULT_MAX_CONTENT_LENGTH
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_url() -> String {
    BASE_API_URL.to_string()
}

impl ClickUpConfig {
    /// Create a config with the given token and defaults elsewhere
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fetch_archived: false,
            cutoff_days: DEFAULT_CUTOFF_DAYS,
            timeout: DEFAULT_TIMEOUT_MS,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_retries: DEFAULT_MAX_RETRIES,
            requests_per_minute: None,
            max_retry_after_secs: None,
            workspaces: Vec::new(),
            base_url: default_base_url(),
        }
    }

    /// Parse a config from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::config(format!("Invalid config JSON: {e}")))
    }

    /// Validate all fields, failing on the first violation
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::invalid_value("token", "must not be an empty string"));
        }
        if self.cutoff_days < 1 {
            return Err(Error::invalid_value(
                "cutoff_days",
                "must be a positive integer",
            ));
        }
        if self.timeout < 1 {
            return Err(Error::invalid_value("timeout", "must be a positive number"));
        }
        if self.max_content_length < 1 {
            return Err(Error::invalid_value(
                "max_content_length",
                "must be a positive number",
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(())
    }

    /// Build the transport configuration
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_millis(self.timeout as u64))
            .max_content_length(self.max_content_length as u64)
            .max_retries(self.max_retries)
            .rate_limit(RateLimiterConfig {
                requests_per_minute: self.requests_per_minute,
                max_retry_after: self.max_retry_after_secs.map(Duration::from_secs),
            })
            .header("authorization", &self.token)
            .header("content-type", "application/json")
            .build()
    }

    /// Whether a workspace passes the configured filter
    pub fn includes_workspace(&self, id: &str) -> bool {
        self.workspaces.is_empty() || self.workspaces.iter().any(|w| w == id)
    }
}
