//! Authenticated request gateway
//!
//! Every call to a protected endpoint goes through [`RequestGateway::send`]:
//! the current token is attached, a 401 triggers one refresh and one retry,
//! and requests that hit 401 while a refresh is running wait in a FIFO queue
//! for its outcome instead of starting their own.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_domain::{AccessToken, ApiRequest, ApiResponse, HttpMethod, Result, SessionError};
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use super::ports::Transport;
use super::refresh::RefreshCoordinator;
use super::token_store::TokenStore;

/// A request parked until the running refresh settles.
struct PendingRequest {
    label: String,
    resolve: oneshot::Sender<Result<AccessToken>>,
}

#[derive(Default)]
struct RefreshGate {
    refreshing: bool,
    pending: VecDeque<PendingRequest>,
}

impl RefreshGate {
    /// Leave the refreshing state and hand `outcome` to every parked request
    /// in arrival order.
    fn settle(&mut self, outcome: &Result<AccessToken>) {
        self.refreshing = false;
        for pending in self.pending.drain(..) {
            debug!(request = %pending.label, ok = outcome.is_ok(), "releasing queued request");
            // The receiver is gone if the caller stopped waiting.
            let _ = pending.resolve.send(outcome.clone());
        }
    }
}

/// Resets the gate if the task driving a refresh is dropped before settling.
struct LeaderGuard<'a> {
    gate: &'a Mutex<RefreshGate>,
    settled: bool,
}

impl LeaderGuard<'_> {
    fn settle(mut self, outcome: &Result<AccessToken>) {
        self.gate.lock().settle(outcome);
        self.settled = true;
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh abandoned before settling; rejecting queued requests");
            self.gate
                .lock()
                .settle(&Err(SessionError::RefreshFailure("refresh abandoned".to_string())));
        }
    }
}

/// Bearer-authenticated access to the backend.
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    store: Arc<TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    gate: Mutex<RefreshGate>,
}

impl RequestGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<TokenStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self { transport, store, coordinator, gate: Mutex::new(RefreshGate::default()) }
    }

    /// Send `request` with the current token.
    ///
    /// A 401 response is answered with one refresh and a single retry whose
    /// response is final, whatever its status. Other statuses are returned
    /// unchanged.
    ///
    /// # Errors
    /// - [`SessionError::SessionExpired`] if the refresh failed; the session
    ///   has been cleared.
    /// - Transport failures from the [`Transport`] port, unchanged.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.store.get_token();
        let response = self.transport.dispatch(&request, token.as_ref()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(had_token = token.is_some(), "request unauthorized; refreshing");
        let fresh = self.await_refresh(&request).await.map_err(|err| {
            self.store.clear();
            SessionError::SessionExpired { reason: err.to_string() }
        })?;

        let retried = self.transport.dispatch(&request, Some(&fresh)).await?;
        if retried.is_unauthorized() {
            warn!("request still unauthorized after refresh");
        }
        Ok(retried)
    }

    /// Number of requests waiting on the running refresh.
    pub fn queued_requests(&self) -> usize {
        self.gate.lock().pending.len()
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<ApiResponse> {
        self.send(with_optional_body(ApiRequest::post(path), body)).await
    }

    pub async fn put(&self, path: &str, body: Option<serde_json::Value>) -> Result<ApiResponse> {
        self.send(with_optional_body(ApiRequest::put(path), body)).await
    }

    pub async fn patch(&self, path: &str, body: Option<serde_json::Value>) -> Result<ApiResponse> {
        self.send(with_optional_body(ApiRequest::patch(path), body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// GET `path` and decode a successful JSON body.
    ///
    /// # Errors
    /// Everything [`Self::send`] returns, plus status and decoding errors
    /// from [`ApiResponse::into_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.into_json()
    }

    /// POST `body` as JSON to `path` and decode a successful JSON body.
    ///
    /// # Errors
    /// Everything [`Self::send`] returns, plus encoding, status and decoding
    /// errors.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(HttpMethod::Post, path).with_json(body)?;
        self.send(request).await?.into_json()
    }

    /// Join the running refresh, or lead a new one.
    async fn await_refresh(&self, request: &ApiRequest) -> Result<AccessToken> {
        let queued = {
            let mut gate = self.gate.lock();
            if gate.refreshing {
                let (resolve, receiver) = oneshot::channel();
                let label = format!("{} {}", request.method().as_str(), request.path());
                debug!(request = %label, position = gate.pending.len(), "queued behind refresh");
                gate.pending.push_back(PendingRequest { label, resolve });
                Some(receiver)
            } else {
                gate.refreshing = true;
                None
            }
        };

        if let Some(receiver) = queued {
            return receiver.await.unwrap_or_else(|_| {
                Err(SessionError::RefreshFailure("refresh abandoned".to_string()))
            });
        }

        let guard = LeaderGuard { gate: &self.gate, settled: false };
        let outcome = self.coordinator.refresh().await;
        guard.settle(&outcome);
        outcome
    }
}

fn with_optional_body(request: ApiRequest, body: Option<serde_json::Value>) -> ApiRequest {
    match body {
        Some(body) => request.with_body(body),
        None => request,
    }
}
