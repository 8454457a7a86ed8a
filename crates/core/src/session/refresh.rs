//! Single-flight token refresh
//!
//! At most one exchange with the token endpoint is in flight at any time.
//! Every caller that arrives while it is pending awaits the same shared
//! result. The slot is emptied inside the operation itself, after the store
//! has been updated, so the next caller after settlement starts a fresh
//! exchange.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use storefront_domain::{AccessToken, Result, SessionError, SessionStatus};
use tracing::{debug, info, instrument, warn};

use super::ports::TokenEndpoint;
use super::signals::SessionSignals;
use super::token_store::TokenStore;

type SharedRefresh = Shared<BoxFuture<'static, Result<AccessToken>>>;

struct InFlight {
    id: u64,
    outcome: SharedRefresh,
}

type RefreshSlot = Arc<Mutex<Option<InFlight>>>;

/// De-duplicates concurrent refresh requests.
pub struct RefreshCoordinator {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<TokenStore>,
    signals: SessionSignals,
    slot: RefreshSlot,
    next_id: AtomicU64,
    exchanges: Arc<AtomicU64>,
}

impl RefreshCoordinator {
    pub fn new(
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<TokenStore>,
        signals: SessionSignals,
    ) -> Self {
        Self {
            endpoint,
            store,
            signals,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
            exchanges: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Obtain a fresh access token.
    ///
    /// Joins the pending exchange if there is one, otherwise starts exactly
    /// one. On success the token is already in the store when this returns;
    /// on failure the store has been cleared.
    ///
    /// # Errors
    /// Returns [`SessionError::RefreshFailure`] when the exchange is rejected,
    /// unreachable or times out.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let outcome = {
            let mut slot = self.slot.lock();
            if let Some(in_flight) = slot.as_ref() {
                debug!(refresh_id = in_flight.id, "joining in-flight refresh");
                in_flight.outcome.clone()
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let outcome = self.start(id);
                *slot = Some(InFlight { id, outcome: outcome.clone() });
                outcome
            }
        };
        outcome.await
    }

    /// Whether an exchange is currently pending.
    pub fn is_refreshing(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Number of exchanges started since creation.
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::SeqCst)
    }

    fn start(&self, id: u64) -> SharedRefresh {
        let endpoint = Arc::clone(&self.endpoint);
        let store = Arc::clone(&self.store);
        let signals = self.signals.clone();
        let slot = Arc::clone(&self.slot);
        let exchanges = Arc::clone(&self.exchanges);

        async move {
            exchanges.fetch_add(1, Ordering::SeqCst);
            debug!(refresh_id = id, "exchanging refresh credential");

            let outcome = match endpoint.exchange().await {
                Ok(grant) => match grant.validated() {
                    Some((token, ttl)) => {
                        store.set_token(token.clone(), ttl);
                        signals.publish(SessionStatus::Authenticated);
                        info!(refresh_id = id, expires_in = ttl, "access token refreshed");
                        Ok(token)
                    }
                    None => Err(SessionError::RefreshFailure(format!(
                        "token endpoint returned an unusable grant (expires_in={})",
                        grant.expires_in
                    ))),
                },
                Err(err) => Err(into_refresh_failure(err)),
            };

            if let Err(err) = &outcome {
                store.clear();
                signals.publish(SessionStatus::unauthenticated_because(err.to_string()));
                warn!(refresh_id = id, error = %err, "token refresh failed; session cleared");
            }

            let mut slot = slot.lock();
            if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
                *slot = None;
            }
            outcome
        }
        .boxed()
        .shared()
    }
}

fn into_refresh_failure(err: SessionError) -> SessionError {
    match err {
        SessionError::RefreshFailure(_) => err,
        other => SessionError::RefreshFailure(other.to_string()),
    }
}
