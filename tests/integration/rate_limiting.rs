//! Host pacing across concurrent callers

use std::sync::Arc;
use std::time::Duration;
use steam_family_aggregator::collector::HostPacer;
use steam_family_aggregator::fetcher::community_http::{build_http_client, CommunityHttpClient};
use steam_family_aggregator::fetcher::retry::RetryPolicy;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GAP: Duration = Duration::from_millis(100);

fn paced_client(server: &MockServer, max_attempts: u32) -> CommunityHttpClient {
    let client = build_http_client(Duration::from_secs(5), Duration::from_secs(5)).unwrap();
    CommunityHttpClient::new(
        Arc::new(client),
        &server.uri(),
        Arc::new(HostPacer::with_jitter(GAP, Duration::ZERO, Duration::ZERO)),
        RetryPolicy::immediate(max_attempts),
    )
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_pacer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let http = paced_client(&server, 1);
    let start = Instant::now();
    let (a, b, c) = tokio::join!(
        http.get(&["a"], &[]),
        http.get(&["b"], &[]),
        http.get(&["c"], &[]),
    );
    let elapsed = start.elapsed();

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    // Three slots: immediate, +GAP, +2*GAP
    assert!(elapsed >= GAP * 2, "three requests took only {elapsed:?}");
}

#[tokio::test]
async fn test_every_retry_attempt_is_paced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let http = paced_client(&server, 3);
    let start = Instant::now();
    let response = http.get(&["busy"], &[]).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(start.elapsed() >= GAP, "retry skipped the pacer");
}

#[tokio::test]
async fn test_clones_share_the_pacer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let http = paced_client(&server, 1);
    let other = http.clone();
    assert!(Arc::ptr_eq(http.pacer(), other.pacer()));

    let start = Instant::now();
    http.get(&["x"], &[]).await.unwrap();
    other.get(&["y"], &[]).await.unwrap();
    assert!(start.elapsed() >= GAP);
}
