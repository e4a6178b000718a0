//! Integration tests for the HTTP gateway against mock servers.

use rust_decimal::Decimal;
use souk::config::{ApiConfig, Locale};
use souk::gateway::{CreditsGateway, EventKind, GatewayError, HttpGateway};
use souk::session::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(server: &MockServer, locale: Locale) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        locale,
    }
}

fn signed_in_tokens() -> Arc<TokenStore> {
    let tokens = Arc::new(TokenStore::new());
    tokens.set("tok-123");
    tokens
}

#[tokio::test]
async fn test_credit_events_sends_auth_and_no_cache_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/notifications/credits"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("cache-control", "no-cache"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 9,
                "type": "credit_approved",
                "request_id": "req-1",
                "amount": 20,
                "created_at": "2026-08-01T10:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let events = gateway.credit_events().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, 9);
    assert_eq!(events[0].kind, EventKind::CreditApproved);
    assert_eq!(events[0].request_id.as_deref(), Some("req-1"));
    assert_eq!(events[0].amount, Some(Decimal::from(20)));
}

#[tokio::test]
async fn test_credit_events_uses_locale_path_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ar/user/notifications/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::Ar), 10, signed_in_tokens());
    let events = gateway.credit_events().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_credit_events_without_token_is_unauthenticated() {
    let server = MockServer::start().await;

    let gateway = HttpGateway::new(
        &api_config(&server, Locale::En),
        10,
        Arc::new(TokenStore::new()),
    );
    let result = gateway.credit_events().await;
    assert!(matches!(result, Err(GatewayError::Unauthenticated)));

    // No request ever left the client.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_credit_events_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/notifications/credits"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let result = gateway.credit_events().await;
    assert!(matches!(result, Err(GatewayError::Http(500))));
}

#[tokio::test]
async fn test_credit_events_non_array_body_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/notifications/credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "maintenance"})),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let result = gateway.credit_events().await;
    assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_credit_events_drops_malformed_elements() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/notifications/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "type": "credit_rejected", "request_id": "req-1"},
            {"bogus": true},
            {"id": 2, "type": "something_new", "request_id": "req-2"}
        ])))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let events = gateway.credit_events().await.unwrap();

    // The element without a valid shape is dropped; the unknown type decodes
    // to Unknown and is kept for the poller to log.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::CreditRejected);
    assert_eq!(events[1].kind, EventKind::Unknown);
}

#[tokio::test]
async fn test_credit_events_timeout_classification() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/notifications/credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 1, signed_in_tokens());
    let result = gateway.credit_events().await;
    assert!(matches!(result, Err(GatewayError::Timeout(1))));
}

#[tokio::test]
async fn test_acknowledge_posts_to_notification_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/en/user/notifications/9/acknowledge"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    assert!(gateway.acknowledge(9).await.is_ok());
}

#[tokio::test]
async fn test_acknowledge_error_status_is_reported() {
    let server = MockServer::start().await;
    // Nothing mounted: wiremock answers 404.

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let result = gateway.acknowledge(9).await;
    assert!(matches!(result, Err(GatewayError::Http(404))));
}

#[tokio::test]
async fn test_profile_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/profile"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "balance": 50.5,
            "name": "Layla",
            "email": "layla@example.com"
        })))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let profile = gateway.profile().await.unwrap();

    assert_eq!(profile.balance, "50.5".parse::<Decimal>().unwrap());
    assert_eq!(profile.name.as_deref(), Some("Layla"));
}

#[tokio::test]
async fn test_profile_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&api_config(&server, Locale::En), 10, signed_in_tokens());
    let result = gateway.profile().await;
    assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
}
