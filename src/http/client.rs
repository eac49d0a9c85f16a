//! HTTP client with retry and rate limiting
//!
//! Provides the transport used by every API call:
//! - Authenticated GET requests against a fixed base URL
//! - Automatic retries with exponential backoff
//! - `retry-after` handling on every response
//! - Response size ceiling
//! - 404 translated to absence instead of an error

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::{FailureKind, RetryDecision, RetryPolicy};
use crate::config::BASE_API_URL;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum accepted response body size in bytes
    pub max_content_length: u64,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Rate limiter configuration
    pub rate_limit: RateLimiterConfig,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_content_length: 10_000_000,
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            rate_limit: RateLimiterConfig::default(),
            default_headers: HashMap::new(),
            user_agent: format!("clickup-source/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the response size ceiling
    pub fn max_content_length(mut self, bytes: u64) -> Self {
        self.config.max_content_length = bytes;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the delay before the first retry
    pub fn initial_backoff(mut self, delay: Duration) -> Self {
        self.config.initial_backoff = delay;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Why reading a response body failed
enum BodyError {
    TooLarge,
    Transport(reqwest::Error),
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    retry: RetryPolicy,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::invalid_value(key, e.to_string()))?;
            let mut value = HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_value(key, e.to_string()))?;
            if name == reqwest::header::AUTHORIZATION {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        let retry = RetryPolicy::new(config.max_retries, config.initial_backoff);
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Ok(Self {
            client,
            config,
            retry,
            rate_limiter,
        })
    }

    /// GET a path and decode the JSON body; `None` when the resource is absent
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestConfig,
    ) -> Result<Option<T>> {
        let Some(body) = self.get(path, &request).await? else {
            return Ok(None);
        };
        let parsed = serde_json::from_slice(&body)
            .map_err(|e| Error::api(format!("Failed to decode response from {path}"), e.into()))?;
        Ok(Some(parsed))
    }

    /// GET a path and return the raw body; `None` when the resource is absent
    pub async fn get(&self, path: &str, request: &RequestConfig) -> Result<Option<Vec<u8>>> {
        let url = self.build_url(path)?;
        let max_retries = self.retry.max_retries;

        let mut retries = 0;
        let mut throttled = 0;

        loop {
            self.rate_limiter.wait().await;
            debug!("GET {path} (retries: {retries}, throttled: {throttled})");

            let (failure, error) = match self
                .client
                .get(url.clone())
                .query(&request.query)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::NOT_FOUND {
                        debug!("{path} not found");
                        return Ok(None);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let headers = response.headers().clone();
                        let body = self.error_body(response).await;
                        match self.retry.decide(FailureKind::Throttled, throttled) {
                            RetryDecision::Retry(delay) => {
                                throttled += 1;
                                warn!(
                                    "Request to {path} was rate limited. Retrying... \
                                     (attempt {throttled} of {max_retries})"
                                );
                                if !self.rate_limiter.on_response(path, &headers).await {
                                    tokio::time::sleep(delay).await;
                                }
                                continue;
                            }
                            _ => {
                                return Err(Error::RateLimited {
                                    path: path.to_string(),
                                    attempts: throttled + 1,
                                    source: Box::new(Error::http_status(path, 429, body)),
                                });
                            }
                        }
                    }

                    if status.is_success() {
                        let headers = response.headers().clone();
                        match self.read_body(response).await {
                            Ok(body) => {
                                self.rate_limiter.on_response(path, &headers).await;
                                return Ok(Some(body));
                            }
                            Err(BodyError::TooLarge) => {
                                return Err(Error::PayloadTooLarge {
                                    path: path.to_string(),
                                    limit: self.config.max_content_length,
                                });
                            }
                            Err(BodyError::Transport(e)) => (
                                FailureKind::from_error(&e),
                                Error::Request {
                                    path: path.to_string(),
                                    source: e,
                                },
                            ),
                        }
                    } else {
                        let body = self.error_body(response).await;
                        (
                            FailureKind::from_status(status).unwrap_or(FailureKind::Other),
                            Error::http_status(path, status.as_u16(), body),
                        )
                    }
                }
                Err(e) => (
                    FailureKind::from_error(&e),
                    Error::Request {
                        path: path.to_string(),
                        source: e,
                    },
                ),
            };

            match self.retry.decide(failure, retries) {
                RetryDecision::Retry(delay) => {
                    retries += 1;
                    info!(
                        "Retrying request {path} due to an error: {error} \
                         (attempt {retries} of {max_retries})"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted => {
                    return Err(Error::MaxRetriesExceeded {
                        path: path.to_string(),
                        attempts: retries + 1,
                        source: Box::new(error),
                    });
                }
                RetryDecision::Fatal => return Err(error),
            }
        }
    }

    /// Read a response body, enforcing the size ceiling while streaming
    async fn read_body(&self, mut response: Response) -> std::result::Result<Vec<u8>, BodyError> {
        let limit = self.config.max_content_length;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(BodyError::TooLarge);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(BodyError::Transport)? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(BodyError::TooLarge);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Body of a failed response, kept for the error message
    async fn error_body(&self, response: Response) -> String {
        match self.read_body(response).await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(BodyError::TooLarge) => {
                format!("<body exceeds {} bytes>", self.config.max_content_length)
            }
            Err(BodyError::Transport(e)) => {
                debug!("Could not read error body: {e}");
                String::new()
            }
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("retry", &self.retry)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}
