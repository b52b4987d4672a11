//! Shared fixtures for tests that stand in for the community host

#![allow(dead_code)]

use std::sync::Arc;
use steam_family_aggregator::collector::config::DiscoveryConfig;
use steam_family_aggregator::collector::RunExecutor;
use steam_family_aggregator::fetcher::community_http::CommunityHttpClient;
use steam_family_aggregator::fetcher::SteamCommunity;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const A: &str = "76561198000000001";
pub const B: &str = "76561198000000002";
pub const C: &str = "76561198000000003";
pub const D: &str = "76561198000000004";
pub const E: &str = "76561198000000005";
pub const F: &str = "76561198000000006";

/// One game of a library document: (app id, name, lifetime hours, recent hours)
pub type GameFixture<'a> = (&'a str, &'a str, &'a str, Option<&'a str>);

/// Vanity lookup document
pub fn vanity_xml(steam_id: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <profile><steamID64>{steam_id}</steamID64><steamID><![CDATA[someone]]></steamID></profile>"
    )
}

/// Vanity lookup document for a handle the site does not know
pub fn vanity_error_xml() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
     <response><error><![CDATA[The specified profile could not be found.]]></error></response>"
}

/// Friends listing in the attribute-based layout
pub fn friends_html(friends: &[(&str, &str)]) -> String {
    let blocks: String = friends
        .iter()
        .map(|(id, name)| {
            format!(
                "<div class=\"selectable friend_block_v2 persona offline\" data-steamid=\"{id}\">\
                 <div class=\"friend_block_content\">{name}<br>\
                 <span class=\"friend_small_text\">Last Online 3 days ago</span></div></div>"
            )
        })
        .collect();
    format!("<html><body><div id=\"search_results\">{blocks}</div></body></html>")
}

/// Friends listing in the link-based layout
pub fn friends_links_html(friends: &[(&str, &str)]) -> String {
    let links: String = friends
        .iter()
        .map(|(id, name)| format!("<a href=\"https://steamcommunity.com/profiles/{id}\">{name}</a>"))
        .collect();
    format!("<html><body><div class=\"friends\">{links}</div></body></html>")
}

/// Library document
pub fn games_xml(games: &[GameFixture<'_>]) -> String {
    let body: String = games
        .iter()
        .map(|(app_id, name, forever, recent)| {
            let recent = recent
                .map(|r| format!("<hoursLast2Weeks>{r}</hoursLast2Weeks>"))
                .unwrap_or_default();
            format!(
                "<game><appID>{app_id}</appID><name><![CDATA[{name}]]></name>\
                 <hoursOnRecord>{forever}</hoursOnRecord>{recent}</game>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <gamesList><games>{body}</games></gamesList>"
    )
}

/// Serve a vanity lookup
pub async fn mount_vanity(server: &MockServer, handle: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/id/{handle}")))
        .and(query_param("xml", "1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve one page of the paginated friends listing
pub async fn mount_friends_page(server: &MockServer, steam_id: &str, page: usize, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/profiles/{steam_id}/friends")))
        .and(query_param("ajax", "1"))
        .and(query_param("p", page.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Serve a library document
pub async fn mount_games(server: &MockServer, steam_id: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/profiles/{steam_id}/games")))
        .and(query_param("tab", "all"))
        .and(query_param("xml", "1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Unpaced client with fast retries against the mock server
pub fn client(server: &MockServer, max_attempts: u32) -> CommunityHttpClient {
    CommunityHttpClient::unpaced(&server.uri(), max_attempts).unwrap()
}

/// Executor over the mock server
pub fn executor(server: &MockServer, discovery: DiscoveryConfig) -> RunExecutor {
    let source = SteamCommunity::new(client(server, 3), discovery);
    RunExecutor::new(Arc::new(source), 3)
}

/// Number of requests the server received for `path`
pub async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
