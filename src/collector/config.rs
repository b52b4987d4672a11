//! Collector configuration constants and run configuration

use std::time::Duration;

/// Default Steam Community host
pub const DEFAULT_BASE_URL: &str = "https://steamcommunity.com";

/// Browser-like user agent; the community site serves reduced markup to
/// unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Minimum spacing between two requests to the community host.
/// 800ms plus jitter keeps a single client well under the informal limits
/// that trigger 429 responses.
pub const DEFAULT_BASE_DELAY_MS: u64 = 800;

/// Lower bound of the uniform jitter added to every pacing slot
pub const PACING_JITTER_MIN_MS: u64 = 50;

/// Upper bound of the uniform jitter added to every pacing slot
pub const PACING_JITTER_MAX_MS: u64 = 200;

/// Total attempts per request, including the first one
pub const MAX_ATTEMPTS: u32 = 5;

/// Initial backoff delay in milliseconds
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay in milliseconds
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Upper bound of the uniform jitter added to every backoff sleep
pub const BACKOFF_JITTER_MAX_MS: u64 = 500;

/// TCP connect timeout
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Overall request timeout (covers reading the body)
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 15;

/// A friends page with fewer entries than this is taken as the last page
pub const FRIENDS_PAGE_SIZE_HINT: usize = 20;

/// Hard cap on friends pages fetched for one seed
pub const MAX_FRIENDS_PAGES: usize = 50;

/// Concurrent library fetches per run
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// Friends included by [`crate::collector::CandidateSelection::FirstAccessible`]
/// when the caller does not say otherwise
pub const DEFAULT_MAX_FRIENDS: usize = 5;

/// Pagination policy for friends discovery
///
/// The "short page means last page" rule is a heuristic about the source,
/// not a guarantee, so both knobs are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Stop after a page with fewer entries than this
    pub page_size_hint: usize,
    /// Stop once the page counter exceeds this
    pub max_pages: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size_hint: FRIENDS_PAGE_SIZE_HINT,
            max_pages: MAX_FRIENDS_PAGES,
        }
    }
}

/// Everything needed to build a collector for one process
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Community host, without trailing path
    pub base_url: String,
    /// Minimum spacing between requests
    pub base_delay: Duration,
    /// Total attempts per request
    pub max_attempts: u32,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Overall request timeout
    pub request_timeout: Duration,
    /// Concurrent library fetches
    pub max_workers: usize,
    /// Friends pagination policy
    pub discovery: DiscoveryConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_attempts: MAX_ATTEMPTS,
            connect_timeout: Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
            max_workers: DEFAULT_MAX_WORKERS,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Override the community host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the pacing base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the attempt cap (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Override the worker pool size (at least one worker)
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Override the friends pagination policy
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }
}
