//! Handle to SteamID64 resolution

use tracing::{debug, warn};

use super::community_http::CommunityHttpClient;
use super::community_parser::CommunityParser;
use super::FetcherError;
use crate::identifier::{is_canonical, SteamId};

/// Why a handle could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Handle was empty after trimming
    #[error("empty handle")]
    EmptyHandle,

    /// Vanity lookup answered with a non-200 status
    #[error("status {0}")]
    Status(u16),

    /// Vanity document was malformed or had no SteamID64
    #[error("{0}")]
    Parse(String),

    /// Transport failure that survived every retry
    #[error("network error: {0}")]
    Network(String),

    /// Lookup URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<FetcherError> for ResolveError {
    fn from(err: FetcherError) -> Self {
        match err {
            FetcherError::NetworkError(msg) | FetcherError::Timeout(msg) => Self::Network(msg),
            FetcherError::HttpStatus(status) => Self::Status(status),
            FetcherError::ParseError(msg) => Self::Parse(msg),
            FetcherError::InvalidUrl(msg) => Self::InvalidUrl(msg),
        }
    }
}

/// Resolve a SteamID64 or vanity handle to a canonical identity
///
/// Canonical input is returned without touching the network. Anything else
/// costs one paced, retried lookup of `/id/{handle}?xml=1`.
pub async fn resolve(http: &CommunityHttpClient, handle: &str) -> Result<SteamId, ResolveError> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(ResolveError::EmptyHandle);
    }
    if is_canonical(handle) {
        return SteamId::parse(handle).map_err(|e| ResolveError::Parse(e.to_string()));
    }

    debug!(handle, "Resolving vanity handle");
    let response = http.get(&["id", handle], &[("xml", "1")]).await?;
    if !response.is_ok() {
        warn!(handle, status = response.status, "Vanity lookup failed");
        return Err(ResolveError::Status(response.status));
    }

    let steam_id = CommunityParser::parse_vanity_xml(&response.body)?;
    debug!(handle, steam_id = %steam_id, "Resolved vanity handle");
    Ok(steam_id)
}
