//! End-to-end behaviour of the session lifecycle against mocked ports.

use std::sync::Arc;
use std::time::Duration;

use storefront_common::assert_eventually_async;
use storefront_common::testing::timeout_ok;
use storefront_common::time::MockClock;
use storefront_core::testing::{MemoryLocation, MemoryStorage, MockTokenEndpoint, MockTransport};
use storefront_core::{BootstrapOutcome, Location, Session, TickOutcome};
use storefront_domain::constants::LOGOUT_PATH;
use storefront_domain::{AccessToken, ApiRequest, SessionConfig, SessionError, SessionStatus};

struct Harness {
    session: Arc<Session>,
    clock: MockClock,
    endpoint: Arc<MockTokenEndpoint>,
    transport: Arc<MockTransport>,
    location: Arc<MemoryLocation>,
    storage: Arc<MemoryStorage>,
}

fn harness(href: &str) -> Harness {
    let clock = MockClock::new();
    let endpoint = Arc::new(MockTokenEndpoint::new());
    let transport = Arc::new(MockTransport::new());
    let location = Arc::new(MemoryLocation::new(href));
    let storage = Arc::new(MemoryStorage::new());
    let session = Session::builder()
        .api_base("http://localhost:8083")
        .config(SessionConfig::default())
        .clock(Arc::new(clock.clone()))
        .token_endpoint(endpoint.clone())
        .transport(transport.clone())
        .location(location.clone())
        .storage(storage.clone())
        .build()
        .expect("session builds");
    Harness { session: Arc::new(session), clock, endpoint, transport, location, storage }
}

#[tokio::test]
async fn stored_token_is_returned_before_expiry() {
    let h = harness("http://localhost:5173/");
    let store = h.session.store();

    for (token, ttl) in [("a", 1_u64), ("b", 60), ("c", 3_600)] {
        store.set_token(AccessToken::new(token), ttl);
        assert_eq!(store.get_token(), Some(AccessToken::new(token)));
    }
}

#[tokio::test]
async fn expiry_is_sticky() {
    let h = harness("http://localhost:5173/");
    let store = h.session.store();
    store.set_token(AccessToken::new("abc"), 60);

    h.clock.advance(Duration::from_secs(60));
    assert_eq!(store.get_token(), None);

    h.clock.set_elapsed(Duration::from_secs(30));
    assert_eq!(store.get_token(), None, "a cleared token must not reappear");
}

/// Validates refresh de-duplication for the two-concurrent-callers scenario.
///
/// Assertions:
/// - Ensures only one backend exchange happens.
/// - Confirms both callers observe the same token.
#[tokio::test]
async fn concurrent_refreshes_share_one_exchange() {
    let h = harness("http://localhost:5173/");
    h.endpoint.hold();
    h.endpoint.push_grant("shared-token", 300);

    let first = {
        let session = Arc::clone(&h.session);
        tokio::spawn(async move { session.coordinator().refresh().await })
    };
    let second = {
        let session = Arc::clone(&h.session);
        tokio::spawn(async move { session.coordinator().refresh().await })
    };
    h.endpoint.wait_for_calls(1).await;
    tokio::task::yield_now().await;
    h.endpoint.release();

    let first = first.await.expect("join").expect("refresh");
    let second = second.await.expect("join").expect("refresh");
    assert_eq!(first, second);
    assert_eq!(first.as_str(), "shared-token");
    assert_eq!(h.endpoint.calls(), 1);
}

/// Validates FIFO queuing for 401s that arrive while a refresh is running.
///
/// Assertions:
/// - Ensures exactly one exchange serves all requests.
/// - Ensures every request is retried once with the new token.
/// - Confirms queued retries leave in the order the requests were queued.
#[tokio::test]
async fn unauthorized_requests_queue_behind_one_refresh() {
    let h = harness("http://localhost:5173/");
    h.session.store().set_token(AccessToken::new("stale"), 300);
    h.transport.reject_token("stale");
    h.endpoint.hold();
    h.endpoint.push_grant("fresh", 300);

    let mut handles = Vec::new();
    for index in 0..4 {
        let session = Arc::clone(&h.session);
        let path = format!("/api/orders/{index}");
        handles.push(tokio::spawn(async move { session.send(ApiRequest::get(path)).await }));
        if index == 0 {
            h.endpoint.wait_for_calls(1).await;
        } else {
            let gateway = Arc::clone(h.session.gateway());
            assert_eventually_async!(Duration::from_secs(2), async {
                gateway.queued_requests() == index
            });
        }
    }
    h.endpoint.release();

    for handle in handles {
        let response = handle.await.expect("join").expect("send");
        assert_eq!(response.status(), 200);
    }
    assert_eq!(h.endpoint.calls(), 1);

    let retries: Vec<_> = h
        .transport
        .calls()
        .into_iter()
        .filter(|call| call.bearer.as_deref() == Some("fresh"))
        .map(|call| call.path)
        .collect();
    assert_eq!(retries.len(), 4);
    assert_eq!(&retries[1..], &["/api/orders/1", "/api/orders/2", "/api/orders/3"]);
}

#[tokio::test]
async fn queued_requests_fail_with_the_refresh() {
    let h = harness("http://localhost:5173/");
    h.session.store().set_token(AccessToken::new("stale"), 300);
    h.transport.reject_token("stale");
    h.endpoint.hold();
    h.endpoint.push_error(SessionError::RefreshFailure("refresh token revoked".into()));

    let leader = {
        let session = Arc::clone(&h.session);
        tokio::spawn(async move { session.send(ApiRequest::get("/api/cart")).await })
    };
    h.endpoint.wait_for_calls(1).await;
    let follower = {
        let session = Arc::clone(&h.session);
        tokio::spawn(async move { session.send(ApiRequest::get("/api/wishlist")).await })
    };
    let gateway = Arc::clone(h.session.gateway());
    assert_eventually_async!(Duration::from_secs(2), async { gateway.queued_requests() == 1 });
    h.endpoint.release();

    for handle in [leader, follower] {
        let err = handle.await.expect("join").expect_err("session expired");
        assert!(
            matches!(&err, SessionError::SessionExpired { reason } if reason.contains("revoked")),
            "unexpected error: {err}"
        );
    }
    assert_eq!(h.endpoint.calls(), 1);
    assert!(!h.session.check_auth_status());
    assert!(matches!(h.session.status(), SessionStatus::Unauthenticated { .. }));
    assert_eq!(h.transport.calls().len(), 2, "no retries after a failed refresh");
}

#[tokio::test]
async fn retry_is_attempted_only_once() {
    let h = harness("http://localhost:5173/");
    h.session.store().set_token(AccessToken::new("stale"), 300);
    h.transport.reject_token("stale");
    h.transport.reject_token("also-rejected");
    h.endpoint.push_grant("also-rejected", 300);

    let response = h.session.send(ApiRequest::get("/api/orders")).await.expect("send");

    assert_eq!(response.status(), 401);
    assert_eq!(h.transport.calls().len(), 2);
    assert_eq!(h.endpoint.calls(), 1);
}

#[tokio::test]
async fn proactive_refresh_fires_once_inside_threshold() {
    let h = harness("http://localhost:5173/");
    let store = h.session.store();
    let threshold = Duration::from_secs(120);
    h.endpoint.push_grant("renewed", 300);

    store.set_token(AccessToken::new("current"), 150);
    assert!(!store.is_near_expiry(threshold));
    assert_eq!(h.session.scheduler().tick().await, TickOutcome::Fresh { remaining_secs: 150 });
    assert_eq!(h.endpoint.calls(), 0);

    store.set_token(AccessToken::new("current"), 90);
    assert!(store.is_near_expiry(threshold));
    assert_eq!(h.session.scheduler().tick().await, TickOutcome::Refreshed);
    assert_eq!(h.endpoint.calls(), 1);

    assert_eq!(h.session.scheduler().tick().await, TickOutcome::Fresh { remaining_secs: 300 });
    assert_eq!(h.endpoint.calls(), 1);
}

#[tokio::test]
async fn bootstrap_consumes_delivered_token() {
    let h = harness("http://localhost:5173/#access_token=abc&expires_in=900");

    let outcome = h.session.bootstrap().await.expect("bootstrap");

    assert_eq!(outcome, BootstrapOutcome::CallbackAccepted { expires_in: 900 });
    assert_eq!(h.session.store().get_token(), Some(AccessToken::new("abc")));
    assert_eq!(h.session.time_until_expiry(), 900);
    assert_eq!(h.location.fragment_reads(), 1);
    assert_eq!(h.location.href(), "http://localhost:5173/");
    assert!(h.session.status().is_authenticated());
    h.session.shutdown().await;
}

#[tokio::test]
async fn bootstrap_surfaces_callback_error() {
    let h = harness("http://localhost:5173/#error=access_denied");

    let err = h.session.bootstrap().await.expect_err("callback error");

    assert_eq!(err, SessionError::Callback { error: "access_denied".into(), description: None });
    assert!(!h.session.check_auth_status());
    assert!(!h.session.status().is_authenticated());
    assert_eq!(h.endpoint.calls(), 0);
}

#[tokio::test]
async fn logout_clears_store_when_backend_is_down() {
    let h = harness("http://localhost:5173/account");
    h.session.store().set_token(AccessToken::new("abc"), 300);
    h.storage.set("checkout_step", "2");
    h.transport.fail_path(LOGOUT_PATH, SessionError::Transport("connection refused".into()));

    h.session.logout().await;

    assert_eq!(h.session.store().get_token(), None);
    assert!(h.storage.is_empty());
    assert_eq!(
        h.location.navigations().last().map(String::as_str),
        Some("http://localhost:8083/api/auth/logout-redirect")
    );
}

#[tokio::test]
async fn status_subscription_follows_lifecycle() {
    let h = harness("http://localhost:5173/#access_token=abc&expires_in=60");
    let mut status = h.session.subscribe();
    assert!(status.borrow_and_update().is_loading());

    h.session.bootstrap().await.expect("bootstrap");
    status.changed().await.expect("status published");
    assert!(status.borrow_and_update().is_authenticated());

    h.endpoint.push_error(SessionError::RefreshFailure("expired".into()));
    assert_eq!(h.session.scheduler().tick().await, TickOutcome::Failed);
    status.changed().await.expect("status published");
    assert!(matches!(*status.borrow(), SessionStatus::Unauthenticated { reason: Some(_) }));
    h.session.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_the_scheduler_promptly() {
    let h = harness("http://localhost:5173/#access_token=abc&expires_in=900");
    h.session.bootstrap().await.expect("bootstrap");
    assert!(h.session.scheduler().is_running().await);

    timeout_ok(Duration::from_secs(1), h.session.shutdown()).await.expect("shutdown in time");

    assert!(!h.session.scheduler().is_running().await);
}
