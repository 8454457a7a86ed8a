//! Application context - dependency injection container

use std::sync::Arc;

use storefront_core::Session;
use storefront_domain::{Config, Result, SessionStatus};
use storefront_infra::{
    HttpClient, HttpTokenEndpoint, HttpTransport, ProcessLocation, RefreshCookieVault,
    SessionScratchStorage,
};
use tracing::{info, instrument, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub http: HttpClient,
    pub transport: Arc<HttpTransport>,
    pub vault: Arc<RefreshCookieVault>,
    pub location: Arc<ProcessLocation>,
    pub storage: Arc<SessionScratchStorage>,
    pub session: Arc<Session>,
}

impl AppContext {
    /// Create a context from the environment or a config file.
    ///
    /// # Errors
    /// Returns [`storefront_domain::SessionError::MissingCredential`] when the
    /// identity provider is not configured.
    pub fn new() -> Result<Self> {
        let config = storefront_infra::config::load()?;
        Self::new_with_config(config)
    }

    /// Create a context whose location starts at the configured app URL.
    ///
    /// # Errors
    /// See [`Self::new_with_location`].
    pub fn new_with_config(config: Config) -> Result<Self> {
        let href = config.api.app_url.clone();
        Self::new_with_location(config, href)
    }

    /// Create a context for an application opened at `href`.
    ///
    /// # Errors
    /// Returns a configuration error if the API base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new_with_location(config: Config, href: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.api.timeout()).build()?;

        let transport = Arc::new(HttpTransport::new(http.clone(), &config.api.base_url)?);
        let base_url = transport.base_url().clone();
        let token_endpoint = Arc::new(HttpTokenEndpoint::new(http.clone(), &base_url)?);
        let vault = Arc::new(RefreshCookieVault::new(http.clone(), &base_url)?);
        let location = Arc::new(ProcessLocation::new(href));
        let storage = Arc::new(SessionScratchStorage::new());

        let session = Session::builder()
            .api_base(base_url.as_str())
            .config(config.session.clone())
            .token_endpoint(token_endpoint)
            .transport(transport.clone())
            .location(location.clone())
            .storage(storage.clone())
            .build()?;

        info!(
            api_base = %base_url,
            realm = %config.identity.realm,
            debug_mode = config.session.debug_mode,
            "application context created"
        );

        Ok(Self {
            config,
            http,
            transport,
            vault,
            location,
            storage,
            session: Arc::new(session),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Aggregate component health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthStatus {
        let backend = match self.transport.health_check().await {
            Ok(true) => ComponentHealth::healthy("backend"),
            Ok(false) => ComponentHealth::unhealthy("backend", "non-success status"),
            Err(err) => ComponentHealth::unhealthy("backend", err.to_string()),
        };

        let status = self.session.status();
        let session = match &status {
            SessionStatus::Loading => ComponentHealth::unhealthy("session", "bootstrap has not run"),
            _ => ComponentHealth::healthy("session"),
        };

        let scheduler_running = self.session.scheduler().is_running().await;
        let scheduler = if status.is_authenticated() && !scheduler_running {
            ComponentHealth::unhealthy("scheduler", "proactive refresh is stopped")
        } else {
            ComponentHealth::healthy("scheduler")
        };

        HealthStatus::new()
            .add_component(backend)
            .add_component(session)
            .add_component(scheduler)
            .scored()
    }

    /// Stop background work.
    pub async fn shutdown(&self) {
        info!("shutdown called on AppContext");
        self.session.shutdown().await;
        if self.session.scheduler().is_running().await {
            warn!("proactive refresh scheduler still running after shutdown");
        }
    }
}
