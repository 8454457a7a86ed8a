//! Session lifecycle over real HTTP adapters against a mock backend.

mod support;

use reqwest::Method;
use serde_json::json;
use storefront_core::Location;
use storefront_domain::{AccessToken, ApiRequest, SessionError, SessionStatus};
use support::HttpSession;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_refresh(server: &MockServer, token: &str, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "expires_in": expires_in })),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Validates the reactive refresh path for the stale-token scenario.
///
/// Assertions:
/// - Ensures the 401 triggers exactly one refresh.
/// - Ensures the retry carries the refreshed bearer token.
/// - Confirms the caller only sees the successful response.
#[tokio::test]
async fn unauthorized_request_is_retried_with_refreshed_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "fresh", 300).await;

    let h = HttpSession::new(&server, "http://localhost:5173/");
    h.session.store().set_token(AccessToken::new("stale"), 300);

    let orders: serde_json::Value =
        h.session.gateway().get_json("/api/orders").await.expect("orders");

    assert_eq!(orders, json!([{ "id": 1 }]));
    assert_eq!(h.session.store().get_token(), Some(AccessToken::new("fresh")));
}

#[tokio::test]
async fn refresh_sends_cookie_from_earlier_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/callback"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=r-1; Path=/; HttpOnly"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("cookie", "refresh_token=r-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t", "expires_in": 60 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = HttpSession::new(&server, "http://localhost:5173/");
    let callback = format!("{}/api/auth/callback", server.uri());
    h.http.send(h.http.request(Method::GET, callback)).await.expect("callback");

    let token = h.session.coordinator().refresh().await.expect("refresh");

    assert_eq!(token.as_str(), "t");
    assert!(h.session.status().is_authenticated());
}

#[tokio::test]
async fn rejected_refresh_expires_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_grant" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = HttpSession::new(&server, "http://localhost:5173/");
    h.session.store().set_token(AccessToken::new("stale"), 300);

    let err = h.session.send(ApiRequest::get("/api/profile")).await.expect_err("expired");

    assert!(
        matches!(&err, SessionError::SessionExpired { reason } if reason.contains("invalid_grant")),
        "unexpected error: {err}"
    );
    assert!(!h.session.check_auth_status());
    assert!(matches!(h.session.status(), SessionStatus::Unauthenticated { .. }));
}

#[tokio::test]
async fn bootstrap_token_is_used_for_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("authorization", "Bearer from-callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cart_items": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let h = HttpSession::new(
        &server,
        "http://localhost:5173/account#access_token=from-callback&expires_in=900",
    );

    h.session.bootstrap().await.expect("bootstrap");
    let response = h.session.gateway().get("/api/dashboard").await.expect("dashboard");

    assert_eq!(response.status(), 200);
    assert_eq!(h.location.href(), "http://localhost:5173/account");
    h.session.shutdown().await;
}

#[tokio::test]
async fn logout_calls_backend_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let h = HttpSession::new(&server, "http://localhost:5173/account");
    h.session.store().set_token(AccessToken::new("abc"), 300);
    h.storage.set("checkout_step", "shipping");

    h.session.logout().await;

    assert_eq!(h.session.store().get_token(), None);
    assert!(h.storage.is_empty());
    assert_eq!(
        h.location.last_navigation(),
        Some(format!("{}/api/auth/logout-redirect", server.uri()))
    );
}

#[tokio::test]
async fn login_redirects_with_return_address() {
    let server = MockServer::start().await;
    let h = HttpSession::new(&server, "http://localhost:5173/checkout");

    h.session.login(None).expect("login");

    let navigation = h.location.last_navigation().expect("navigated");
    let url = url::Url::parse(&navigation).expect("login url");
    assert_eq!(url.path(), "/api/auth/login");
    let redirect: Vec<_> = url.query_pairs().collect();
    assert_eq!(redirect[0].0, "redirect_uri");
    assert_eq!(redirect[0].1, "http://localhost:5173/checkout");
}
