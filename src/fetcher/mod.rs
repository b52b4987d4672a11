//! Steam Community access
//!
//! Every call into the community site goes through [`community_http::CommunityHttpClient`],
//! which paces the request with the shared [`crate::collector::HostPacer`] and
//! retries transient failures via [`retry::fetch_with_retry`].

use crate::identifier::SteamId;
use crate::{GameEntry, RelationCandidate};
use async_trait::async_trait;
use bytes::Bytes;

pub mod community_http;
pub mod community_parser;
pub mod friends;
pub mod library;
pub mod resolver;
pub mod retry;
pub mod steam_community;

pub use resolver::ResolveError;
pub use steam_community::SteamCommunity;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport failure (timeout, refused connection, truncated body)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Request or body read timed out
    #[error("timeout: {0}")]
    Timeout(String),

    /// Terminal non-success status
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// Response body could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Status and fully read body of one HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Build a response from parts
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is exactly 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Source of profiles, friends and libraries
///
/// Implemented by [`SteamCommunity`] for the live site; the run executor only
/// depends on this trait so it can be driven by any other source.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Turn a handle (SteamID64 or vanity name) into a canonical identity
    async fn resolve(&self, handle: &str) -> Result<SteamId, ResolveError>;

    /// List the seed's friends, deduplicated by identity
    async fn discover_friends(&self, seed: &SteamId) -> FetcherResult<Vec<RelationCandidate>>;

    /// Whether the profile's library can be read at all
    ///
    /// Any failure to determine this is reported as `false`.
    async fn probe_library(&self, steam_id: &SteamId) -> bool;

    /// Fetch and parse the profile's full library
    async fn fetch_library(&self, steam_id: &SteamId) -> FetcherResult<Vec<GameEntry>>;
}
