//! Friends discovery against a mock community host

use steam_family_aggregator::collector::config::DiscoveryConfig;
use steam_family_aggregator::fetcher::friends::discover_friends;
use steam_family_aggregator::SteamId;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::*;

fn id(s: &str) -> SteamId {
    SteamId::parse(s).unwrap()
}

fn pages(page_size_hint: usize, max_pages: usize) -> DiscoveryConfig {
    DiscoveryConfig {
        page_size_hint,
        max_pages,
    }
}

fn ids(friends: &[steam_family_aggregator::RelationCandidate]) -> Vec<&str> {
    friends.iter().map(|f| f.steam_id.as_str()).collect()
}

#[tokio::test]
async fn test_walks_pages_until_short_page() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, friends_html(&[(B, "b"), (C, "c")])).await;
    mount_friends_page(&server, A, 2, 200, friends_html(&[(D, "d"), (E, "e")])).await;
    mount_friends_page(&server, A, 3, 200, friends_html(&[(F, "f")])).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &pages(2, 50))
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B, C, D, E, F]);
    assert_eq!(requests_to(&server, &format!("/profiles/{A}/friends")).await, 3);
}

#[tokio::test]
async fn test_duplicates_keep_first_name() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, friends_html(&[(B, "first"), (C, "c")])).await;
    mount_friends_page(&server, A, 2, 200, friends_html(&[(B, "second")])).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &pages(2, 50))
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B, C]);
    assert_eq!(friends[0].name, "first");
}

#[tokio::test]
async fn test_empty_first_page_falls_back_to_plain_listing() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, "<html><body></body></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path(format!("/profiles/{A}/friends")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(friends_links_html(&[(B, "Bravo"), (C, "")])),
        )
        .mount(&server)
        .await;

    let friends = discover_friends(&client(&server, 1), &id(A), &DiscoveryConfig::default())
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B, C]);
    assert_eq!(friends[0].name, "Bravo");
    // An anchor without text is named by its id
    assert_eq!(friends[1].name, C);
    // Paginated page 1, then the plain listing once
    assert_eq!(requests_to(&server, &format!("/profiles/{A}/friends")).await, 2);
}

#[tokio::test]
async fn test_empty_fallback_ends_discovery() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, friends_html(&[])).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &DiscoveryConfig::default())
        .await
        .unwrap();
    assert!(friends.is_empty());
}

#[tokio::test]
async fn test_non_200_page_keeps_collected_friends() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, friends_html(&[(B, "b"), (C, "c")])).await;
    mount_friends_page(&server, A, 2, 403, String::new()).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &pages(2, 50))
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B, C]);
}

#[tokio::test]
async fn test_page_cap() {
    let server = MockServer::start().await;
    mount_friends_page(&server, A, 1, 200, friends_html(&[(B, "b")])).await;
    mount_friends_page(&server, A, 2, 200, friends_html(&[(C, "c")])).await;
    mount_friends_page(&server, A, 3, 200, friends_html(&[(D, "d")])).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &pages(1, 2))
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B, C]);
    assert_eq!(requests_to(&server, &format!("/profiles/{A}/friends")).await, 2);
}

#[tokio::test]
async fn test_invalid_ids_are_skipped() {
    let server = MockServer::start().await;
    let body = "<div data-steamid=\"123\">short</div>\
                <div data-steamid=\"7656119800000000x\">bad</div>\
                <div data-steamid=\"76561198000000002\">ok</div>"
        .to_string();
    mount_friends_page(&server, A, 1, 200, body).await;

    let friends = discover_friends(&client(&server, 1), &id(A), &DiscoveryConfig::default())
        .await
        .unwrap();
    assert_eq!(ids(&friends), vec![B]);
    assert_eq!(friends[0].name, "ok");
}
