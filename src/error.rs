//! Error types for the ClickUp source
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the ClickUp source
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to get {path}: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to get {path}: HTTP {status}: {body}")]
    HttpStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Request to {path} was rate limited after {attempts} attempts: {source}")]
    RateLimited {
        path: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Request to {path} failed after {attempts} attempts: {source}")]
    MaxRetriesExceeded {
        path: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Response from {path} exceeds the maximum content length of {limit} bytes")]
    PayloadTooLarge { path: String, limit: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Connector Errors
    // ============================================================================
    #[error("{message}")]
    ConnectionCheck { message: String },

    #[error("{message}: {source}")]
    Api {
        message: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Unknown stream: {name}")]
    UnknownStream { name: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a connection check error
    pub fn connection_check(message: impl Into<String>) -> Self {
        Self::ConnectionCheck {
            message: message.into(),
        }
    }

    /// Wrap an error with a human-readable message, keeping it as the source
    pub fn api(message: impl Into<String>, source: Error) -> Self {
        Self::Api {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }
}

/// Result type alias for the ClickUp source
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::api(message, e.into()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::api(f(), e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_value("token", "must not be an empty string");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'token': must not be an empty string"
        );

        let err = Error::http_status("/team", 403, "Forbidden");
        assert_eq!(err.to_string(), "Failed to get /team: HTTP 403: Forbidden");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = Error::RateLimited {
            path: "/team".to_string(),
            attempts: 4,
            source: Box::new(Error::http_status("/team", 429, "")),
        };
        assert!(err
            .to_string()
            .starts_with("Request to /team was rate limited after 4 attempts"));
    }

    #[test]
    fn test_result_context_keeps_source() {
        let result: Result<()> = Err(Error::config("inner"));
        let err = result.context("outer").unwrap_err();

        assert_eq!(err.to_string(), "outer: Configuration error: inner");
        let source = err.source().expect("wrapped error should expose its source");
        assert_eq!(source.to_string(), "Configuration error: inner");
    }

    #[test]
    fn test_with_context_wraps_http_status() {
        let result: Result<()> = Err(Error::http_status("/space/1/folder", 500, "boom"));
        let err = result
            .with_context(|| "Failed to fetch folders for space id 1".to_string())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to fetch folders for space id 1: Failed to get /space/1/folder: HTTP 500: boom"
        );
        match err {
            Error::Api { source, .. } => {
                assert!(matches!(*source, Error::HttpStatus { status: 500, .. }));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
