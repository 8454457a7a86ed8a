//! Proactive refresh scheduler
//!
//! Periodically checks the token and refreshes it shortly before it expires,
//! so that requests rarely meet a 401 at all.

use std::sync::Arc;
use std::time::Duration;

use storefront_common::time::format_remaining;
use storefront_domain::constants::{DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REFRESH_THRESHOLD_SECS};
use storefront_domain::SessionConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::refresh::RefreshCoordinator;
use super::token_store::TokenStore;

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the proactive refresh scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between checks
    pub interval: Duration,
    /// Refresh once less than this much validity remains
    pub threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            threshold: Duration::from_secs(DEFAULT_REFRESH_THRESHOLD_SECS),
        }
    }
}

impl From<&SessionConfig> for SchedulerConfig {
    fn from(config: &SessionConfig) -> Self {
        Self { interval: config.refresh_interval(), threshold: config.refresh_threshold() }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No valid token; nothing to refresh.
    NoToken,
    /// Token has more than the threshold left.
    Fresh { remaining_secs: u64 },
    Refreshed,
    /// The refresh failed; the session has been cleared.
    Failed,
}

#[derive(Clone)]
struct RefreshCheck {
    store: Arc<TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    threshold: Duration,
}

impl RefreshCheck {
    async fn run(&self) -> TickOutcome {
        if self.store.get_token().is_none() {
            return TickOutcome::NoToken;
        }
        if !self.store.is_near_expiry(self.threshold) {
            return TickOutcome::Fresh { remaining_secs: self.store.time_until_expiry() };
        }

        info!(
            remaining = %format_remaining(self.store.time_until_expiry()),
            "token near expiry; refreshing proactively"
        );
        match self.coordinator.refresh().await {
            Ok(_) => TickOutcome::Refreshed,
            Err(err) => {
                warn!(error = %err, "proactive refresh failed");
                TickOutcome::Failed
            }
        }
    }
}

/// Background task driving proactive refresh
pub struct ProactiveRefreshScheduler {
    check: RefreshCheck,
    interval: Duration,
    cancellation_token: parking_lot::Mutex<CancellationToken>,
    task_handle: TaskHandle,
}

impl ProactiveRefreshScheduler {
    pub fn new(
        store: Arc<TokenStore>,
        coordinator: Arc<RefreshCoordinator>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            check: RefreshCheck { store, coordinator, threshold: config.threshold },
            interval: config.interval,
            cancellation_token: parking_lot::Mutex::new(CancellationToken::new()),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the background loop.
    ///
    /// # Errors
    /// Returns an error if the scheduler is already running.
    #[instrument(skip(self), fields(interval_secs = self.interval.as_secs()))]
    pub async fn start(&self) -> Result<(), String> {
        let mut handle = self.task_handle.lock().await;
        if handle.is_some() {
            return Err("Scheduler already running".to_string());
        }

        let cancel = CancellationToken::new();
        *self.cancellation_token.lock() = cancel.clone();

        let check = self.check.clone();
        let interval = self.interval;
        *handle = Some(tokio::spawn(async move {
            Self::refresh_loop(check, interval, cancel).await;
        }));

        info!("Proactive refresh scheduler started");
        Ok(())
    }

    /// Stop the background loop and wait for it to finish.
    ///
    /// # Errors
    /// Returns an error if the scheduler is not running or the task did not
    /// shut down cleanly.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), String> {
        let Some(handle) = self.task_handle.lock().await.take() else {
            return Err("Scheduler not running".to_string());
        };

        self.cancellation_token.lock().cancel();

        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Scheduler task panicked");
                return Err("Scheduler task panicked".to_string());
            }
            Err(_) => {
                warn!("Scheduler task did not complete within timeout");
                return Err("Scheduler task timeout".to_string());
            }
        }

        info!("Proactive refresh scheduler stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.task_handle.lock().await.is_some()
    }

    /// Run one check immediately.
    pub async fn tick(&self) -> TickOutcome {
        self.check.run().await
    }

    async fn refresh_loop(check: RefreshCheck, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Refresh loop cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let outcome = check.run().await;
                    debug!(?outcome, "Proactive refresh check");
                }
            }
        }
    }
}

impl Drop for ProactiveRefreshScheduler {
    fn drop(&mut self) {
        let cancel = self.cancellation_token.lock();
        if !cancel.is_cancelled() {
            cancel.cancel();
        }
    }
}
