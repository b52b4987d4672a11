//! Retry behaviour of the community HTTP client against a mock host

use steam_family_aggregator::fetcher::community_http::CommunityHttpClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::*;

async fn mount_status(server: &MockServer, status: u16, times: Option<u64>, priority: u8) {
    let mock = Mock::given(method("GET"))
        .and(path("/id/robin"))
        .respond_with(ResponseTemplate::new(status).set_body_string(format!("status {status}")))
        .with_priority(priority);
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

#[tokio::test]
async fn test_transient_statuses_are_retried_until_success() {
    let server = MockServer::start().await;
    mount_status(&server, 503, Some(2), 1).await;
    mount_status(&server, 200, None, 2).await;

    let response = client(&server, 5).get(&["id", "robin"], &[]).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(requests_to(&server, "/id/robin").await, 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    mount_status(&server, 404, None, 1).await;

    let response = client(&server, 5).get(&["id", "robin"], &[]).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(requests_to(&server, "/id/robin").await, 1);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let server = MockServer::start().await;
    mount_status(&server, 429, Some(1), 1).await;
    mount_status(&server, 200, None, 2).await;

    let response = client(&server, 5).get(&["id", "robin"], &[]).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(requests_to(&server, "/id/robin").await, 2);
}

#[tokio::test]
async fn test_exhaustion_returns_last_status() {
    let server = MockServer::start().await;
    mount_status(&server, 502, None, 1).await;

    let response = client(&server, 3).get(&["id", "robin"], &[]).await.unwrap();
    assert_eq!(response.status, 502);
    assert_eq!(requests_to(&server, "/id/robin").await, 3);
}

#[tokio::test]
async fn test_max_attempts_one_means_single_request() {
    let server = MockServer::start().await;
    mount_status(&server, 500, None, 1).await;

    let response = client(&server, 1).get(&["id", "robin"], &[]).await.unwrap();
    assert_eq!(response.status, 500);
    assert_eq!(requests_to(&server, "/id/robin").await, 1);
}

#[tokio::test]
async fn test_connection_failure_after_retries_is_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let http = CommunityHttpClient::unpaced(&uri, 2).unwrap();
    let result = http.get(&["id", "robin"], &[]).await;
    assert!(result.is_err());
}
