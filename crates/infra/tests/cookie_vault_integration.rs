//! Refresh-cookie vault against a mock backend.

use std::time::Duration;

use serde_json::json;
use storefront_core::TokenStore;
use storefront_domain::AccessToken;
use storefront_infra::{HttpClient, RefreshCookieVault, VaultAuthStatus};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn vault(server: &MockServer) -> RefreshCookieVault {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    RefreshCookieVault::new(HttpClient::new().expect("http client"), &base).expect("vault")
}

#[tokio::test]
async fn store_refresh_token_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/secure/tokens/refresh"))
        .and(body_json(json!({ "refreshToken": "r-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "stored" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(vault(&server).store_refresh_token("r-123").await);
}

#[tokio::test]
async fn failures_are_reported_as_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let vault = vault(&server);
    assert!(!vault.store_refresh_token("r-123").await);
    assert!(!vault.clear_refresh_token().await);
    assert!(!vault.has_refresh_token().await);
}

#[tokio::test]
async fn unreachable_backend_is_reported_as_false() {
    let base = Url::parse("http://127.0.0.1:1").expect("url");
    let http = HttpClient::builder().timeout(Duration::from_secs(2)).build().expect("http client");
    let vault = RefreshCookieVault::new(http, &base).expect("vault");

    assert!(!vault.has_refresh_token().await);
}

/// Validates the combined status for the access-plus-refresh scenario.
///
/// Assertions:
/// - Ensures authentication requires both tokens.
/// - Confirms logout clears the in-memory token even when the vault fails.
#[tokio::test]
async fn check_status_combines_memory_and_vault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/secure/tokens/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hasRefreshToken": true })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/secure/tokens/refresh"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let vault = vault(&server);
    let store = TokenStore::new();

    assert_eq!(
        vault.check_status(&store).await,
        VaultAuthStatus { has_access_token: false, has_refresh_token: true, is_authenticated: false }
    );

    store.set_token(AccessToken::new("abc"), 300);
    assert!(vault.check_status(&store).await.is_authenticated);

    vault.logout(&store).await;
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn setup_after_login_stores_both_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/secure/tokens/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "stored" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = TokenStore::new();
    let stored = vault(&server)
        .setup_after_login(&store, AccessToken::new("access"), 300, "refresh")
        .await;

    assert!(stored);
    assert_eq!(store.get_token(), Some(AccessToken::new("access")));
}
