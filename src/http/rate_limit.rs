//! Rate limiting implementation
//!
//! Two mechanisms live here:
//! - honoring the server's `retry-after` directive, which suspends the caller
//!   for the advertised number of seconds
//! - an optional client-side token bucket (governor) that spaces requests out
//!   before the server has to throttle them

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::header::HeaderMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for rate limiting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Client-side quota; no local throttling when absent or zero
    pub requests_per_minute: Option<u32>,
    /// Ceiling applied to `retry-after` waits
    pub max_retry_after: Option<Duration>,
}

impl RateLimiterConfig {
    /// Create a config with a client-side quota
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute: Some(requests_per_minute),
            max_retry_after: None,
        }
    }
}

/// A `retry-after` directive read from response headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDirective {
    /// How long to wait before issuing any further request
    pub retry_after: Duration,
    /// Remaining quota reported by `x-ratelimit-remaining`
    pub remaining: Option<String>,
    /// Total quota reported by `x-ratelimit-limit`
    pub limit: Option<String>,
}

impl RateLimitDirective {
    /// Read a directive from headers, if one is present and numeric
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = header_str(headers, "retry-after")?;
        let Some(seconds) = parse_seconds(&raw) else {
            debug!("Ignoring non-numeric retry-after value: {raw}");
            return None;
        };

        Some(Self {
            retry_after: Duration::from_secs(seconds),
            remaining: header_str(headers, "x-ratelimit-remaining"),
            limit: header_str(headers, "x-ratelimit-limit"),
        })
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Whole seconds; fractional values are truncated
fn parse_seconds(raw: &str) -> Option<u64> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

type DirectGovernor = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate-limit governor shared by all requests of one client
#[derive(Clone)]
pub struct RateLimiter {
    quota: Option<Arc<DirectGovernor>>,
    max_retry_after: Option<Duration>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = config
            .requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(Governor::direct(Quota::per_minute(n))));

        Self {
            quota,
            max_retry_after: config.max_retry_after,
        }
    }

    /// Wait until the client-side quota allows another request
    pub async fn wait(&self) {
        if let Some(quota) = &self.quota {
            quota.until_ready().await;
        }
    }

    /// Effective wait for a directive, after applying the ceiling
    pub fn wait_for(&self, directive: &RateLimitDirective) -> Duration {
        match self.max_retry_after {
            Some(ceiling) => directive.retry_after.min(ceiling),
            None => directive.retry_after,
        }
    }

    /// Inspect a response and suspend if it carries a `retry-after` directive.
    ///
    /// Returns whether the caller was suspended.
    pub async fn on_response(&self, path: &str, headers: &HeaderMap) -> bool {
        let Some(directive) = RateLimitDirective::from_headers(headers) else {
            return false;
        };

        let wait = self.wait_for(&directive);
        warn!(
            "'Retry-After' response header is detected when requesting {path}. \
             Waiting for {} seconds before making any requests. \
             (TSTUs remaining: {}, TSTUs total limit: {})",
            wait.as_secs(),
            directive.remaining.as_deref().unwrap_or("unknown"),
            directive.limit.as_deref().unwrap_or("unknown"),
        );
        tokio::time::sleep(wait).await;
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("has_quota", &self.quota.is_some())
            .field("max_retry_after", &self.max_retry_after)
            .finish()
    }
}
