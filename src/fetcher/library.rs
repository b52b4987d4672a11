//! Library access probing and fetching
//!
//! Both operations read the same document, `/profiles/{id}/games?tab=all&xml=1`.

use tracing::{debug, info};

use super::community_http::CommunityHttpClient;
use super::community_parser::CommunityParser;
use super::{FetcherError, FetcherResult};
use crate::identifier::SteamId;
use crate::GameEntry;

const LIBRARY_QUERY: [(&str, &str); 2] = [("tab", "all"), ("xml", "1")];

fn library_path(steam_id: &SteamId) -> [&str; 3] {
    ["profiles", steam_id.as_str(), "games"]
}

/// Whether the library answers 200 with a well-formed document
///
/// An empty game list counts as accessible. Every failure, including
/// transport errors, is reported as `false`.
pub async fn probe_library(http: &CommunityHttpClient, steam_id: &SteamId) -> bool {
    let response = match http.get(&library_path(steam_id), &LIBRARY_QUERY).await {
        Ok(response) => response,
        Err(e) => {
            debug!(steam_id = %steam_id, error = %e, "Library probe failed");
            return false;
        }
    };

    let accessible = response.is_ok() && CommunityParser::is_well_formed_xml(&response.body);
    debug!(steam_id = %steam_id, status = response.status, accessible, "Library probed");
    accessible
}

/// Fetch and parse every game in the library
///
/// # Errors
/// - `HttpStatus` for any non-200 answer
/// - `ParseError` when the document is not well-formed
/// - `NetworkError`/`Timeout` when every attempt failed in transport
pub async fn fetch_library(
    http: &CommunityHttpClient,
    steam_id: &SteamId,
) -> FetcherResult<Vec<GameEntry>> {
    let response = http.get(&library_path(steam_id), &LIBRARY_QUERY).await?;
    if !response.is_ok() {
        return Err(FetcherError::HttpStatus(response.status));
    }

    let games = CommunityParser::parse_library_xml(&response.body)?;
    info!(steam_id = %steam_id, games = games.len(), "Fetched library");
    Ok(games)
}
