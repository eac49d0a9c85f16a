//! Retry classification and backoff
//!
//! The client only ever issues GET requests, so every request is idempotent:
//! connection-level failures and 5xx responses are retried with exponential
//! backoff, throttled requests are retried under the same attempt budget, and
//! everything else fails on the first attempt.

use reqwest::StatusCode;
use std::time::Duration;

/// Cause-chain fragments that make a retry unsafe or pointless
const RETRY_DENYLIST: &[&str] = &[
    "certificate",
    "invalid peer",
    "handshake",
    "dns error",
    "failed to lookup address",
    "network is unreachable",
    "network unreachable",
];

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was received
    Network {
        /// False for failures a retry cannot fix (TLS, DNS, no route)
        retry_allowed: bool,
    },
    /// 5xx response
    ServerError(u16),
    /// 429 response
    Throttled,
    /// Any other 4xx response
    ClientError(u16),
    /// Request could not be built, redirected too often, or similar
    Other,
}

impl FailureKind {
    /// Classify a non-success status; `None` for 2xx and 404
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return None;
        }
        Some(match status {
            StatusCode::TOO_MANY_REQUESTS => Self::Throttled,
            s if s.is_server_error() => Self::ServerError(s.as_u16()),
            s if s.is_client_error() => Self::ClientError(s.as_u16()),
            _ => Self::Other,
        })
    }

    /// Classify a transport error
    pub fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network {
                retry_allowed: true,
            };
        }
        if err.is_connect() || err.is_request() || err.is_body() {
            return Self::Network {
                retry_allowed: is_retry_allowed(err),
            };
        }
        if let Some(status) = err.status() {
            return Self::from_status(status).unwrap_or(Self::Other);
        }
        Self::Other
    }

    /// Whether this kind of failure may be retried at all
    pub fn is_retryable(self) -> bool {
        match self {
            Self::Network { retry_allowed } => retry_allowed,
            Self::ServerError(_) | Self::Throttled => true,
            Self::ClientError(_) | Self::Other => false,
        }
    }
}

/// Walk the error's cause chain looking for failures a retry cannot fix
fn is_retry_allowed(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if RETRY_DENYLIST.iter().any(|needle| message.contains(needle)) {
            return false;
        }
        current = e.source();
    }
    true
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the delay
    Retry(Duration),
    /// Retryable, but the attempt budget is spent
    Exhausted,
    /// Not retryable
    Fatal,
}

/// Exponential backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed per logical request
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Decide how to proceed given how many retries were already made
    pub fn decide(&self, failure: FailureKind, retries: u32) -> RetryDecision {
        if !failure.is_retryable() {
            return RetryDecision::Fatal;
        }
        if retries >= self.max_retries {
            return RetryDecision::Exhausted;
        }
        RetryDecision::Retry(self.backoff(retries))
    }

    /// Delay before retry number `retries + 1`: `initial * 2^retries`
    pub fn backoff(&self, retries: u32) -> Duration {
        let factor = 2u32.saturating_pow(retries);
        self.initial_backoff.saturating_mul(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(StatusCode::OK => None ; "success")]
    #[test_case(StatusCode::NOT_FOUND => None ; "absence")]
    #[test_case(StatusCode::TOO_MANY_REQUESTS => Some(FailureKind::Throttled) ; "throttled")]
    #[test_case(StatusCode::BAD_GATEWAY => Some(FailureKind::ServerError(502)) ; "server error")]
    #[test_case(StatusCode::UNAUTHORIZED => Some(FailureKind::ClientError(401)) ; "client error")]
    fn test_from_status(status: StatusCode) -> Option<FailureKind> {
        FailureKind::from_status(status)
    }

    #[test_case(FailureKind::Network { retry_allowed: true }, 0 => RetryDecision::Retry(Duration::from_millis(100)) ; "network first retry")]
    #[test_case(FailureKind::Network { retry_allowed: true }, 2 => RetryDecision::Retry(Duration::from_millis(400)) ; "network third retry")]
    #[test_case(FailureKind::Network { retry_allowed: true }, 3 => RetryDecision::Exhausted ; "network exhausted")]
    #[test_case(FailureKind::Network { retry_allowed: false }, 0 => RetryDecision::Fatal ; "unsafe network")]
    #[test_case(FailureKind::ServerError(503), 1 => RetryDecision::Retry(Duration::from_millis(200)) ; "server error retried")]
    #[test_case(FailureKind::Throttled, 3 => RetryDecision::Exhausted ; "throttled exhausted")]
    #[test_case(FailureKind::ClientError(400), 0 => RetryDecision::Fatal ; "client error fatal")]
    #[test_case(FailureKind::Other, 0 => RetryDecision::Fatal ; "other fatal")]
    fn test_decide(failure: FailureKind, retries: u32) -> RetryDecision {
        RetryPolicy::default().decide(failure, retries)
    }

    #[test]
    fn test_backoff_grows_without_cap() {
        let policy = RetryPolicy::new(20, Duration::from_millis(100));
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(4), Duration::from_millis(1_600));
        assert_eq!(policy.backoff(10), Duration::from_millis(102_400));
        // Saturates instead of overflowing
        assert!(policy.backoff(200) >= policy.backoff(31));
    }

    #[test]
    fn test_zero_retries_never_retries() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(
            policy.decide(FailureKind::ServerError(500), 0),
            RetryDecision::Exhausted
        );
    }

    #[derive(Debug)]
    struct Chain(&'static str, Option<Box<Chain>>);

    impl std::fmt::Display for Chain {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Chain {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|c| c as _)
        }
    }

    #[test]
    fn test_retry_allowed_inspects_cause_chain() {
        let reset = Chain("error sending request", Some(Box::new(Chain("connection reset by peer", None))));
        assert!(is_retry_allowed(&reset));

        let dns = Chain(
            "error sending request",
            Some(Box::new(Chain("dns error: failed to lookup address information", None))),
        );
        assert!(!is_retry_allowed(&dns));

        let tls = Chain("invalid peer certificate: UnknownIssuer", None);
        assert!(!is_retry_allowed(&tls));

        let unreachable = Chain(
            "error sending request",
            Some(Box::new(Chain("Network is unreachable (os error 101)", None))),
        );
        assert!(!is_retry_allowed(&unreachable));
    }
}
