//! Paginated friends discovery

use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::community_http::CommunityHttpClient;
use super::community_parser::CommunityParser;
use super::FetcherResult;
use crate::collector::config::DiscoveryConfig;
use crate::identifier::SteamId;
use crate::RelationCandidate;

/// List the seed's friends, first seen wins
///
/// Walks `/profiles/{seed}/friends?ajax=1&p=N` from page 1. A non-200 page
/// ends the walk with whatever was collected. An empty first page triggers a
/// single fetch of the plain friends page instead. A page shorter than
/// `page_size_hint`, or running past `max_pages`, ends the walk.
///
/// # Errors
/// Only URL construction errors and transport failures on the first page
/// are returned; later failures end pagination quietly.
pub async fn discover_friends(
    http: &CommunityHttpClient,
    seed: &SteamId,
    discovery: &DiscoveryConfig,
) -> FetcherResult<Vec<RelationCandidate>> {
    let mut friends: Vec<RelationCandidate> = Vec::new();
    let mut seen: HashSet<SteamId> = HashSet::new();
    let mut page = 1usize;

    while page <= discovery.max_pages {
        let page_param = page.to_string();
        let response = match http
            .get(
                &["profiles", seed.as_str(), "friends"],
                &[("ajax", "1"), ("p", page_param.as_str())],
            )
            .await
        {
            Ok(response) => response,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                warn!(seed = %seed, page, error = %e, "Friends page failed, stopping");
                break;
            }
        };

        if !response.is_ok() {
            warn!(seed = %seed, page, status = response.status, "Friends page returned non-200, stopping");
            break;
        }

        let mut entries = CommunityParser::parse_friends_html(&String::from_utf8_lossy(&response.body));

        if entries.is_empty() && page == 1 {
            debug!(seed = %seed, "Paginated listing empty, trying plain friends page");
            let fallback = http.get(&["profiles", seed.as_str(), "friends"], &[]).await?;
            if fallback.is_ok() {
                entries = CommunityParser::parse_friends_html(&String::from_utf8_lossy(&fallback.body));
            }
            if entries.is_empty() {
                break;
            }
        }

        let page_len = entries.len();
        for entry in entries {
            if seen.insert(entry.steam_id.clone()) {
                friends.push(entry);
            }
        }
        debug!(seed = %seed, page, entries = page_len, total = friends.len(), "Parsed friends page");

        if page_len < discovery.page_size_hint {
            break;
        }
        page += 1;
    }

    info!(seed = %seed, friends = friends.len(), pages = page, "Friends discovery complete");
    Ok(friends)
}
