//! Mock implementations of the session ports

#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use storefront_common::testing::poll_until;
use storefront_domain::{
    AccessToken, ApiRequest, ApiResponse, HttpMethod, Result, SessionError, TokenGrant,
};
use tokio::sync::watch;

use crate::session::ports::{AuxiliaryStorage, Location, TokenEndpoint, Transport};

/// Scripted token endpoint.
///
/// Responses are consumed in order; an empty script answers with a refresh
/// failure. [`hold`](Self::hold) parks every exchange until
/// [`release`](Self::release), which lets tests pile up concurrent callers.
pub struct MockTokenEndpoint {
    script: Mutex<VecDeque<Result<TokenGrant>>>,
    calls: AtomicUsize,
    held: watch::Sender<bool>,
}

impl MockTokenEndpoint {
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self { script: Mutex::new(VecDeque::new()), calls: AtomicUsize::new(0), held }
    }

    pub fn push_grant(&self, token: &str, expires_in: i64) {
        self.script.lock().push_back(Ok(TokenGrant::new(token, expires_in)));
    }

    pub fn push_error(&self, err: SessionError) {
        self.script.lock().push_back(Err(err));
    }

    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    /// Exchanges started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` exchanges have started.
    pub async fn wait_for_calls(&self, count: usize) {
        let reached =
            poll_until(Duration::from_secs(5), Duration::from_millis(1), move || async move {
                self.calls() >= count
            })
            .await;
        assert!(reached, "expected {count} token exchanges, saw {}", self.calls());
    }
}

impl Default for MockTokenEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenEndpoint for MockTokenEndpoint {
    async fn exchange(&self) -> Result<TokenGrant> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut held = self.held.subscribe();
        loop {
            let is_held = *held.borrow_and_update();
            if !is_held || held.changed().await.is_err() {
                break;
            }
        }

        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(SessionError::RefreshFailure("no scripted token response".to_string()))
        })
    }
}

/// A dispatch observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

enum Route {
    Respond(ApiResponse),
    Fail(SessionError),
}

/// Recording transport.
///
/// Precedence per dispatch: a failing path, then a rejected bearer (401),
/// then a scripted route, then `200 {}`.
pub struct MockTransport {
    rejected: Mutex<HashSet<String>>,
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            rejected: Mutex::new(HashSet::new()),
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer 401 to any request carrying `token`.
    pub fn reject_token(&self, token: &str) {
        self.rejected.lock().insert(token.to_string());
    }

    pub fn respond_with_status(&self, path: &str, status: u16) {
        self.routes.lock().insert(path.to_string(), Route::Respond(ApiResponse::new(status, "")));
    }

    pub fn respond_with_json(&self, path: &str, body: Value) {
        let response = ApiResponse::new(200, body.to_string().into_bytes());
        self.routes.lock().insert(path.to_string(), Route::Respond(response));
    }

    pub fn fail_path(&self, path: &str, err: SessionError) {
        self.routes.lock().insert(path.to_string(), Route::Fail(err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        self.calls.lock().push(RecordedCall {
            method: request.method(),
            path: request.path().to_string(),
            bearer: bearer.map(|token| token.as_str().to_string()),
            body: request.body().cloned(),
        });

        if let Some(Route::Fail(err)) = self.routes.lock().get(request.path()) {
            return Err(err.clone());
        }
        if bearer.is_some_and(|token| self.rejected.lock().contains(token.as_str())) {
            return Ok(ApiResponse::new(401, r#"{"error":"invalid_token"}"#));
        }
        match self.routes.lock().get(request.path()) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            _ => Ok(ApiResponse::new(200, "{}")),
        }
    }
}

/// Location that records navigations instead of performing them.
pub struct MemoryLocation {
    href: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    fragment_reads: AtomicUsize,
}

impl MemoryLocation {
    pub fn new(href: &str) -> Self {
        Self {
            href: Mutex::new(href.to_string()),
            navigations: Mutex::new(Vec::new()),
            fragment_reads: AtomicUsize::new(0),
        }
    }

    pub fn set_href(&self, href: &str) {
        *self.href.lock() = href.to_string();
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn fragment_reads(&self) -> usize {
        self.fragment_reads.load(Ordering::SeqCst)
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.href.lock().clone()
    }

    fn fragment(&self) -> Option<String> {
        self.fragment_reads.fetch_add(1, Ordering::SeqCst);
        let href = self.href.lock();
        href.split_once('#').map(|(_, fragment)| fragment.to_string())
    }

    fn strip_fragment(&self) {
        let mut href = self.href.lock();
        if let Some(index) = href.find('#') {
            href.truncate(index);
        }
    }

    fn navigate(&self, url: &str) {
        self.navigations.lock().push(url.to_string());
        *self.href.lock() = url.to_string();
    }
}

/// Key/value scratch storage.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuxiliaryStorage for MemoryStorage {
    fn clear(&self) {
        self.entries.lock().clear();
    }
}
