//! Integration tests for token caching and single-flight refresh
//!
//! The token provider shares one cached token across all operations, refreshes
//! it through the rate limiter, and collapses concurrent refreshes into a
//! single exchange.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use directory_cli::api::{
    ApiError, ClientFactory, PageCursor, RateLimiter, TokenProvider, UserOperations,
    build_http_client,
};
use directory_cli::config::Settings;

fn settings_for(server: &MockServer, requests_per_second: u32) -> Arc<Settings> {
    Arc::new(Settings {
        base_url: server.uri(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        connection_name: "Username-Password-Authentication".to_string(),
        requests_per_second,
    })
}

fn provider_for(server: &MockServer, requests_per_second: u32) -> TokenProvider {
    let settings = settings_for(server, requests_per_second);
    let limiter = Arc::new(RateLimiter::new(requests_per_second).unwrap());
    TokenProvider::new(settings, limiter, build_http_client())
}

fn operations_for(server: &MockServer, requests_per_second: u32) -> UserOperations {
    let settings = settings_for(server, requests_per_second);
    let limiter = Arc::new(RateLimiter::new(requests_per_second).unwrap());
    let http = build_http_client();
    let tokens = Arc::new(TokenProvider::new(
        settings.clone(),
        limiter.clone(),
        http.clone(),
    ));
    let factory = ClientFactory::new(settings.clone(), tokens, http);
    UserOperations::new(settings, limiter, factory)
}

async fn mount_token_endpoint(server: &MockServer, expires_in: u64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": expires_in
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_empty_listing(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Test that a long-lived token is exchanged once and reused by later calls
#[tokio::test]
async fn test_token_is_cached_across_operations() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 86400, 1).await;
    mount_empty_listing(&server, 2).await;

    let ops = operations_for(&server, 10);
    let cancel = CancellationToken::new();

    ops.list_users(PageCursor::first(), &cancel).await.unwrap();
    ops.list_users(PageCursor::first(), &cancel).await.unwrap();
}

/// Test that a token shorter-lived than the safety buffer is refreshed on
/// every operation
#[tokio::test]
async fn test_short_lived_token_is_refreshed_every_time() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 30, 2).await;
    mount_empty_listing(&server, 2).await;

    let ops = operations_for(&server, 10);
    let cancel = CancellationToken::new();

    ops.list_users(PageCursor::first(), &cancel).await.unwrap();
    ops.list_users(PageCursor::first(), &cancel).await.unwrap();
}

/// Test that concurrent cold-cache callers collapse into one exchange
#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": "shared-token",
                    "token_type": "Bearer",
                    "expires_in": 86400
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(provider_for(&server, 100));
    let cancel = CancellationToken::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let tokens = tokens.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(
            async move { tokens.get_access_token(&cancel).await },
        ));
    }

    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert_eq!(token, "shared-token");
    }
}

/// Test that a failed exchange leaves the cache empty and the next call
/// exchanges again
#[tokio::test]
async fn test_failed_exchange_is_retried_on_the_next_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream outage"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "second-token",
            "token_type": "Bearer",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = provider_for(&server, 10);
    let cancel = CancellationToken::new();

    let first = tokens.get_access_token(&cancel).await;
    assert!(matches!(first, Err(ApiError::Auth { .. })));

    let second = tokens.get_access_token(&cancel).await.unwrap();
    assert_eq!(second, "second-token");
}

/// Test that an already-canceled session never reaches the token endpoint
#[tokio::test]
async fn test_canceled_session_never_reaches_the_token_endpoint() {
    let server = MockServer::start().await;

    let tokens = provider_for(&server, 10);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = tokens.get_access_token(&cancel).await;

    assert!(matches!(result, Err(ApiError::Canceled)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
