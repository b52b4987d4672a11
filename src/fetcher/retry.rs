//! Retry with exponential backoff for community requests
//!
//! Pacing keeps the common case under the host's informal limits; this layer
//! recovers when a limit is hit anyway or the host is briefly degraded.
//!
//! Outcome classes:
//! - status < 400, or 404: final answer, returned as is
//! - 429, 500, 502, 503, 504, or a network failure: transient, retried
//! - any other status: final answer, returned as is

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{FetcherError, FetcherResult, HttpResponse};
use crate::collector::config::{
    BACKOFF_JITTER_MAX_MS, INITIAL_BACKOFF_MS, MAX_ATTEMPTS, MAX_BACKOFF_MS,
};

/// Classification of transient failures for retry messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Request or body read timed out
    NetworkTimeout,
    /// Connection refused, DNS failure, truncated body
    NetworkGeneric,
    /// HTTP 429
    RateLimit,
    /// HTTP 500/502/503/504
    ServerError(u16),
}

impl RetryErrorType {
    /// Transient class for a status, or `None` when the status is final
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            429 => Some(Self::RateLimit),
            500 | 502 | 503 | 504 => Some(Self::ServerError(status)),
            _ => None,
        }
    }

    /// Transient class for a fetch error, or `None` when it must not be retried
    pub fn from_error(err: &FetcherError) -> Option<Self> {
        match err {
            FetcherError::Timeout(_) => Some(Self::NetworkTimeout),
            FetcherError::NetworkError(_) => Some(Self::NetworkGeneric),
            _ => None,
        }
    }

    /// User-friendly description used inside retry log messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkGeneric => "network error",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
        }
    }

    /// Suggested remediation printed once retries are exhausted
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Check your network connection and firewall settings",
            Self::NetworkGeneric => "Check network connectivity and try again",
            Self::RateLimit => "Increase --base-delay-ms or wait a few minutes before the next run",
            Self::ServerError(_) => "Steam Community may be having issues, try again later",
        }
    }
}

/// Backoff policy for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap for the doubled delay
    pub max_delay: Duration,
    /// Upper bound of the uniform jitter added to each sleep
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_jitter: Duration::from_millis(BACKOFF_JITTER_MAX_MS),
        }
    }
}

impl RetryPolicy {
    /// Default delays with a custom attempt cap
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Millisecond delays and no jitter, for tests against local servers
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_jitter: Duration::ZERO,
        }
    }

    /// Exponential delay before retry number `retry_count` (zero-based), without jitter
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let factor = 2u32.checked_pow(retry_count).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(0.0..=self.max_jitter.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Context for formatting retry messages
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Attempt about to be made (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of failure that triggered the retry
    pub error_type: RetryErrorType,
    /// Sleep before the next attempt
    pub backoff_duration: Duration,
    /// URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Format the message logged before sleeping
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds... ({})",
            self.attempt,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64(),
            self.endpoint
        )
    }

    /// Format the message logged when a retried request finally succeeds
    pub fn format_success(&self) -> String {
        format!(
            "Retry attempt {}/{} succeeded ({})",
            self.attempt, self.max_attempts, self.endpoint
        )
    }

    /// Format the summary logged once every attempt failed
    pub fn format_failure(&self) -> String {
        [
            format!("[FAILED] Request failed after {} attempts", self.max_attempts),
            format!("  Last error: {}", self.error_type.description()),
            format!("  Endpoint: {}", self.endpoint),
            format!("  Suggestion: {}", self.error_type.suggestion()),
        ]
        .join("\n")
    }
}

/// Run `request_fn` until it yields a final answer or attempts run out
///
/// `request_fn` performs exactly one attempt (including any pacing). When
/// attempts are exhausted the last response received is returned so the caller
/// can inspect its status; if no response was ever received the last network
/// error is returned instead. Errors that are not transport failures are
/// returned immediately.
pub async fn fetch_with_retry<F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut request_fn: F,
) -> FetcherResult<HttpResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetcherResult<HttpResponse>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_response: Option<HttpResponse> = None;
    let mut last_error: Option<FetcherError> = None;
    let mut last_type = RetryErrorType::NetworkGeneric;

    for attempt in 1..=max_attempts {
        let error_type = match request_fn().await {
            Ok(response) => match RetryErrorType::from_status(response.status) {
                None => {
                    if attempt > 1 {
                        let ctx = RetryContext {
                            attempt,
                            max_attempts,
                            error_type: last_type,
                            backoff_duration: Duration::ZERO,
                            endpoint: endpoint.to_string(),
                        };
                        info!("{}", ctx.format_success());
                    }
                    debug!(status = response.status, attempt, "request finished");
                    return Ok(response);
                }
                Some(error_type) => {
                    last_response = Some(response);
                    error_type
                }
            },
            Err(err) => match RetryErrorType::from_error(&err) {
                Some(error_type) => {
                    debug!(error = %err, attempt, "transient network failure");
                    last_error = Some(err);
                    error_type
                }
                None => return Err(err),
            },
        };
        last_type = error_type;

        if attempt == max_attempts {
            break;
        }

        let backoff = policy.backoff(attempt - 1) + policy.jitter();
        let ctx = RetryContext {
            attempt: attempt + 1,
            max_attempts,
            error_type,
            backoff_duration: backoff,
            endpoint: endpoint.to_string(),
        };
        warn!("{}", ctx.format_retry());
        sleep(backoff).await;
    }

    let ctx = RetryContext {
        attempt: max_attempts,
        max_attempts,
        error_type: last_type,
        backoff_duration: Duration::ZERO,
        endpoint: endpoint.to_string(),
    };
    warn!("{}", ctx.format_failure());

    match last_response {
        Some(response) => Ok(response),
        None => Err(last_error.unwrap_or_else(|| {
            FetcherError::NetworkError("all retries exhausted".to_string())
        })),
    }
}
