//! HTTP client module
//!
//! Provides the transport with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Automatic Retries**: connection failures and 5xx responses, exponential backoff
//! - **Throttling**: 429 responses retried under the same attempt budget
//! - **Retry-After**: any response carrying the header suspends the caller
//! - **Client Quota**: optional token bucket using governor
//! - **Absence**: 404 is returned as `None`, never as an error

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimitDirective, RateLimiter, RateLimiterConfig};
pub use retry::{FailureKind, RetryDecision, RetryPolicy};
