//! Handle resolution against a mock community host

use steam_family_aggregator::fetcher::resolver::resolve;
use steam_family_aggregator::fetcher::ResolveError;
use wiremock::MockServer;

use crate::support::*;

#[tokio::test]
async fn test_vanity_resolves_to_steam_id() {
    let server = MockServer::start().await;
    mount_vanity(&server, "robin", 200, vanity_xml(A)).await;

    let id = resolve(&client(&server, 1), " robin ").await.unwrap();
    assert_eq!(id.as_str(), A);
}

#[tokio::test]
async fn test_canonical_id_makes_no_request() {
    let server = MockServer::start().await;

    let id = resolve(&client(&server, 1), A).await.unwrap();
    assert_eq!(id.as_str(), A);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_empty_handle_makes_no_request() {
    let server = MockServer::start().await;

    let err = resolve(&client(&server, 1), "  ").await.unwrap_err();
    assert_eq!(err, ResolveError::EmptyHandle);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_non_200_is_status_error() {
    let server = MockServer::start().await;
    mount_vanity(&server, "ghost", 404, String::new()).await;

    let err = resolve(&client(&server, 1), "ghost").await.unwrap_err();
    assert_eq!(err, ResolveError::Status(404));
    assert_eq!(err.to_string(), "status 404");
}

#[tokio::test]
async fn test_source_error_text_is_reported() {
    let server = MockServer::start().await;
    mount_vanity(&server, "nobody", 200, vanity_error_xml().to_string()).await;

    let err = resolve(&client(&server, 1), "nobody").await.unwrap_err();
    match err {
        ResolveError::Parse(message) => {
            assert!(message.contains("could not be found"), "got {message}")
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_document_is_parse_error() {
    let server = MockServer::start().await;
    mount_vanity(&server, "broken", 200, "<profile><steamID64>".to_string()).await;

    let err = resolve(&client(&server, 1), "broken").await.unwrap_err();
    assert!(matches!(err, ResolveError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_non_canonical_steam_id_is_parse_error() {
    let server = MockServer::start().await;
    mount_vanity(&server, "odd", 200, vanity_xml("12345")).await;

    let err = resolve(&client(&server, 1), "odd").await.unwrap_err();
    assert!(matches!(err, ResolveError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_handle_is_path_encoded() {
    let server = MockServer::start().await;
    mount_vanity(&server, "a%20b", 200, vanity_xml(B)).await;

    let id = resolve(&client(&server, 1), "a b").await.unwrap();
    assert_eq!(id.as_str(), B);
}
