//! Session facade
//!
//! [`Session`] wires the store, coordinator, gateway, scheduler and
//! bootstrap together and exposes what the UI needs: login, logout, status
//! and authenticated requests. One instance is created per running
//! application; there is no global.

use std::sync::Arc;

use storefront_common::time::{Clock, SystemClock};
use storefront_domain::constants::{
    LOGIN_PATH, LOGOUT_PATH, LOGOUT_REDIRECT_PATH, REDIRECT_URI_PARAM,
};
use storefront_domain::{
    ApiRequest, ApiResponse, Result, SessionConfig, SessionError, SessionStatus,
    TokenDiagnostics,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::bootstrap::{BootstrapOutcome, SessionBootstrap};
use super::gateway::RequestGateway;
use super::ports::{AuxiliaryStorage, Location, TokenEndpoint, Transport};
use super::refresh::RefreshCoordinator;
use super::scheduler::{ProactiveRefreshScheduler, SchedulerConfig};
use super::signals::SessionSignals;
use super::token_store::TokenStore;

/// Client-side session of the storefront.
pub struct Session {
    api_base: Url,
    config: SessionConfig,
    store: Arc<TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    gateway: Arc<RequestGateway>,
    scheduler: Arc<ProactiveRefreshScheduler>,
    bootstrap: SessionBootstrap,
    signals: SessionSignals,
    location: Arc<dyn Location>,
    storage: Arc<dyn AuxiliaryStorage>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Run the one-time bootstrap. See [`SessionBootstrap::run`].
    ///
    /// # Errors
    /// Returns [`SessionError::Callback`] when login failed.
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome> {
        self.bootstrap.run().await
    }

    /// Navigate to the backend login entry point, returning to `return_to`
    /// (or the current address) afterwards.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] if the login URL cannot be
    /// built from the API base.
    #[instrument(skip(self))]
    pub fn login(&self, return_to: Option<&str>) -> Result<()> {
        let redirect = return_to.map_or_else(|| self.location.href(), str::to_string);
        let mut url = self.endpoint(LOGIN_PATH)?;
        url.query_pairs_mut().append_pair(REDIRECT_URI_PARAM, &redirect);
        info!(redirect_uri = %redirect, "redirecting to login");
        self.location.navigate(url.as_str());
        Ok(())
    }

    /// End the session.
    ///
    /// The backend logout call is best effort: whatever it returns, local
    /// state is cleared and the page navigates to the logout redirect.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        match self.gateway.send(ApiRequest::post(LOGOUT_PATH)).await {
            Ok(response) if response.is_success() => debug!("backend logout acknowledged"),
            Ok(response) => warn!(status = response.status(), "backend logout rejected"),
            Err(err) => warn!(error = %err, "backend logout failed"),
        }

        self.store.clear();
        self.storage.clear();
        self.signals.publish(SessionStatus::unauthenticated());
        if let Err(err) = self.scheduler.stop().await {
            debug!(error = %err, "scheduler was not running");
        }

        match self.endpoint(LOGOUT_REDIRECT_PATH) {
            Ok(url) => self.location.navigate(url.as_str()),
            Err(err) => warn!(error = %err, "cannot build logout redirect"),
        }
        info!("logged out");
    }

    /// Send a request through the authenticated gateway.
    ///
    /// # Errors
    /// See [`RequestGateway::send`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.gateway.send(request).await
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &Arc<ProactiveRefreshScheduler> {
        &self.scheduler
    }

    /// Whether a valid access token is held right now.
    pub fn check_auth_status(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn time_until_expiry(&self) -> u64 {
        self.store.time_until_expiry()
    }

    pub fn status(&self) -> SessionStatus {
        self.signals.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.signals.subscribe()
    }

    /// Cross-view sync hook. See [`SessionBootstrap::on_storage_changed`].
    pub async fn on_storage_changed(&self) -> SessionStatus {
        self.bootstrap.on_storage_changed().await
    }

    /// Token introspection, only available with `debug_mode` enabled.
    pub fn diagnostics(&self) -> Option<TokenDiagnostics> {
        if !self.config.debug_mode {
            return None;
        }
        let mut snapshot = self.store.snapshot(self.config.refresh_threshold());
        snapshot.refresh_in_flight = self.coordinator.is_refreshing();
        Some(snapshot)
    }

    /// Stop background work.
    pub async fn shutdown(&self) {
        if self.scheduler.is_running().await {
            if let Err(err) = self.scheduler.stop().await {
                warn!(error = %err, "scheduler did not stop cleanly");
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| SessionError::Configuration(format!("invalid endpoint {path}: {e}")))
    }
}

/// Builder for [`Session`]
#[derive(Default)]
pub struct SessionBuilder {
    api_base: Option<String>,
    config: SessionConfig,
    clock: Option<Arc<dyn Clock>>,
    endpoint: Option<Arc<dyn TokenEndpoint>>,
    transport: Option<Arc<dyn Transport>>,
    location: Option<Arc<dyn Location>>,
    storage: Option<Arc<dyn AuxiliaryStorage>>,
}

impl SessionBuilder {
    #[must_use]
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn token_endpoint(mut self, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn location(mut self, location: Arc<dyn Location>) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn AuxiliaryStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Assemble the session.
    ///
    /// # Errors
    /// Returns [`SessionError::Configuration`] if a port is missing or the API
    /// base is not an absolute URL.
    pub fn build(self) -> Result<Session> {
        let api_base = self.api_base.ok_or_else(|| missing("api_base"))?;
        let api_base = Url::parse(&api_base)
            .map_err(|e| SessionError::Configuration(format!("invalid API base {api_base}: {e}")))?;
        let endpoint = self.endpoint.ok_or_else(|| missing("token_endpoint"))?;
        let transport = self.transport.ok_or_else(|| missing("transport"))?;
        let location = self.location.ok_or_else(|| missing("location"))?;
        let storage = self.storage.ok_or_else(|| missing("storage"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let signals = SessionSignals::new();
        let store = Arc::new(TokenStore::with_clock(clock));
        let coordinator =
            Arc::new(RefreshCoordinator::new(endpoint, Arc::clone(&store), signals.clone()));
        let gateway =
            Arc::new(RequestGateway::new(transport, Arc::clone(&store), Arc::clone(&coordinator)));
        let scheduler = Arc::new(ProactiveRefreshScheduler::new(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            SchedulerConfig::from(&self.config),
        ));
        let bootstrap = SessionBootstrap::new(
            Arc::clone(&location),
            Arc::clone(&store),
            Arc::clone(&scheduler),
            signals.clone(),
        );

        Ok(Session {
            api_base,
            config: self.config,
            store,
            coordinator,
            gateway,
            scheduler,
            bootstrap,
            signals,
            location,
            storage,
        })
    }
}

fn missing(part: &str) -> SessionError {
    SessionError::Configuration(format!("session builder is missing {part}"))
}
