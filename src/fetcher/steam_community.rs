//! Live Steam Community profile source

use async_trait::async_trait;

use super::community_http::CommunityHttpClient;
use super::{friends, library, resolver, FetcherResult, ProfileSource, ResolveError};
use crate::collector::config::{CollectorConfig, DiscoveryConfig};
use crate::identifier::SteamId;
use crate::{GameEntry, RelationCandidate};

/// [`ProfileSource`] backed by the community site
///
/// Cloning shares the underlying HTTP client and pacer.
#[derive(Clone)]
pub struct SteamCommunity {
    http: CommunityHttpClient,
    discovery: DiscoveryConfig,
}

impl SteamCommunity {
    /// Create a source over an existing client
    pub fn new(http: CommunityHttpClient, discovery: DiscoveryConfig) -> Self {
        Self { http, discovery }
    }

    /// Create a source with its own client and pacer
    pub fn from_config(config: &CollectorConfig) -> FetcherResult<Self> {
        Ok(Self::new(
            CommunityHttpClient::from_config(config)?,
            config.discovery,
        ))
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &CommunityHttpClient {
        &self.http
    }
}

#[async_trait]
impl ProfileSource for SteamCommunity {
    async fn resolve(&self, handle: &str) -> Result<SteamId, ResolveError> {
        resolver::resolve(&self.http, handle).await
    }

    async fn discover_friends(&self, seed: &SteamId) -> FetcherResult<Vec<RelationCandidate>> {
        friends::discover_friends(&self.http, seed, &self.discovery).await
    }

    async fn probe_library(&self, steam_id: &SteamId) -> bool {
        library::probe_library(&self.http, steam_id).await
    }

    async fn fetch_library(&self, steam_id: &SteamId) -> FetcherResult<Vec<GameEntry>> {
        library::fetch_library(&self.http, steam_id).await
    }
}
