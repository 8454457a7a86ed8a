//! Session bootstrap
//!
//! Runs once when the application starts. The login callback delivers the
//! access token in the location fragment; without one, a session still held
//! in memory is resumed.
//!
//! ```text
//! Loading ──callback token / valid store──▶ Authenticated ──▶ scheduler started
//!    │
//!    └──error marker / no valid token────▶ Unauthenticated
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use storefront_domain::{CallbackFragment, Result, SessionError, SessionStatus};
use tracing::{debug, info, instrument, warn};

use super::ports::Location;
use super::scheduler::ProactiveRefreshScheduler;
use super::signals::SessionSignals;
use super::token_store::TokenStore;

/// How the session was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The login callback delivered a token.
    CallbackAccepted { expires_in: u64 },
    /// A valid token was already in memory.
    Resumed,
    /// No callback and no valid token.
    SignedOut,
    /// Bootstrap had already run; the fragment was not read again.
    AlreadyBootstrapped(SessionStatus),
}

/// One-time start-up of the session.
pub struct SessionBootstrap {
    location: Arc<dyn Location>,
    store: Arc<TokenStore>,
    scheduler: Arc<ProactiveRefreshScheduler>,
    signals: SessionSignals,
    started: AtomicBool,
}

impl SessionBootstrap {
    pub fn new(
        location: Arc<dyn Location>,
        store: Arc<TokenStore>,
        scheduler: Arc<ProactiveRefreshScheduler>,
        signals: SessionSignals,
    ) -> Self {
        Self { location, store, scheduler, signals, started: AtomicBool::new(false) }
    }

    /// Establish the initial session state.
    ///
    /// # Errors
    /// Returns [`SessionError::Callback`] when the
    /// callback reports a login failure or carries an unusable token. The
    /// session is then unauthenticated and the store is left untouched.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<BootstrapOutcome> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("bootstrap already ran");
            return Ok(BootstrapOutcome::AlreadyBootstrapped(self.signals.current()));
        }

        let callback = self.location.fragment().as_deref().and_then(CallbackFragment::parse);
        let outcome = match callback {
            Some(CallbackFragment::Token { access_token, expires_in }) => {
                self.store.set_token(access_token, expires_in);
                self.location.strip_fragment();
                info!(expires_in, "session established from login callback");
                BootstrapOutcome::CallbackAccepted { expires_in }
            }
            Some(rejected) => {
                self.location.strip_fragment();
                let err = rejected.to_error().unwrap_or_else(|| SessionError::Callback {
                    error: "unrecognized_callback".to_string(),
                    description: None,
                });
                warn!(error = %err, "login callback rejected");
                self.signals.publish(SessionStatus::unauthenticated_because(err.to_string()));
                return Err(err);
            }
            None if self.store.is_authenticated() => {
                debug!("resuming in-memory session");
                BootstrapOutcome::Resumed
            }
            None => BootstrapOutcome::SignedOut,
        };

        if matches!(outcome, BootstrapOutcome::SignedOut) {
            self.signals.publish(SessionStatus::unauthenticated());
        } else {
            self.signals.publish(SessionStatus::Authenticated);
            self.ensure_scheduler().await;
        }
        Ok(outcome)
    }

    /// Whether [`Self::run`] has been called.
    pub fn has_run(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Re-evaluate the store after another view changed shared state.
    ///
    /// Ignored until bootstrap has run.
    #[instrument(skip(self))]
    pub async fn on_storage_changed(&self) -> SessionStatus {
        let current = self.signals.current();
        if current.is_loading() {
            return current;
        }

        let authenticated = self.store.is_authenticated();
        if authenticated && !current.is_authenticated() {
            self.signals.publish(SessionStatus::Authenticated);
            self.ensure_scheduler().await;
        } else if !authenticated && current.is_authenticated() {
            self.signals.publish(SessionStatus::unauthenticated());
        }
        self.signals.current()
    }

    async fn ensure_scheduler(&self) {
        if self.scheduler.is_running().await {
            return;
        }
        if let Err(err) = self.scheduler.start().await {
            debug!(error = %err, "scheduler not started");
        }
    }
}

#[cfg(test)]
mod tests {
    use storefront_common::time::MockClock;
    use storefront_domain::AccessToken;

    use super::*;
    use crate::session::refresh::RefreshCoordinator;
    use crate::session::scheduler::SchedulerConfig;
    use crate::testing::{MemoryLocation, MockTokenEndpoint};

    struct Fixture {
        bootstrap: SessionBootstrap,
        location: Arc<MemoryLocation>,
        store: Arc<TokenStore>,
        scheduler: Arc<ProactiveRefreshScheduler>,
        signals: SessionSignals,
    }

    fn fixture(href: &str) -> Fixture {
        let store = Arc::new(TokenStore::with_clock(Arc::new(MockClock::new())));
        let signals = SessionSignals::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(MockTokenEndpoint::new()),
            Arc::clone(&store),
            signals.clone(),
        ));
        let scheduler = Arc::new(ProactiveRefreshScheduler::new(
            Arc::clone(&store),
            coordinator,
            SchedulerConfig::default(),
        ));
        let location = Arc::new(MemoryLocation::new(href));
        let bootstrap = SessionBootstrap::new(
            location.clone(),
            Arc::clone(&store),
            Arc::clone(&scheduler),
            signals.clone(),
        );
        Fixture { bootstrap, location, store, scheduler, signals }
    }

    /// Validates bootstrap for the delivered-token scenario.
    ///
    /// Assertions:
    /// - Ensures the token is stored with the delivered lifetime.
    /// - Ensures the fragment is removed from the address.
    /// - Confirms the session is authenticated and the scheduler runs.
    #[tokio::test]
    async fn callback_token_authenticates() {
        let fx = fixture("http://localhost:5173/#access_token=abc&expires_in=300");

        let outcome = fx.bootstrap.run().await.expect("bootstrap");

        assert_eq!(outcome, BootstrapOutcome::CallbackAccepted { expires_in: 300 });
        assert_eq!(fx.store.get_token(), Some(AccessToken::new("abc")));
        assert_eq!(fx.store.time_until_expiry(), 300);
        assert_eq!(fx.location.href(), "http://localhost:5173/");
        assert!(fx.signals.current().is_authenticated());
        assert!(fx.scheduler.is_running().await);
        fx.scheduler.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn callback_error_is_surfaced_and_store_untouched() {
        let fx = fixture(
            "http://localhost:5173/#error=authentication_failed&error_description=Invalid%20state",
        );
        fx.store.set_token(AccessToken::new("kept"), 300);

        let err = fx.bootstrap.run().await.expect_err("callback error");

        assert_eq!(
            err,
            SessionError::Callback {
                error: "authentication_failed".into(),
                description: Some("Invalid state".into()),
            }
        );
        assert_eq!(fx.store.get_token(), Some(AccessToken::new("kept")));
        assert!(matches!(fx.signals.current(), SessionStatus::Unauthenticated { reason: Some(_) }));
        assert!(!fx.scheduler.is_running().await);
    }

    #[tokio::test]
    async fn malformed_callback_is_rejected() {
        let fx = fixture("http://localhost:5173/#access_token=abc&expires_in=0");

        let err = fx.bootstrap.run().await.expect_err("malformed");

        assert!(matches!(err, SessionError::Callback { .. }));
        assert_eq!(fx.store.get_token(), None);
    }

    #[tokio::test]
    async fn oversized_callback_lifetime_is_rejected() {
        let fx = fixture("http://localhost:5173/#access_token=abc&expires_in=9223372036854775807");

        let err = fx.bootstrap.run().await.expect_err("out of range");

        assert!(
            matches!(&err, SessionError::Callback { error, .. } if error == "malformed_callback"),
            "unexpected error: {err}"
        );
        assert_eq!(fx.store.get_token(), None);
        assert_eq!(fx.location.href(), "http://localhost:5173/");
        assert!(!fx.scheduler.is_running().await);
    }

    #[tokio::test]
    async fn no_callback_resumes_valid_session() {
        let fx = fixture("http://localhost:5173/cart");
        fx.store.set_token(AccessToken::new("live"), 300);

        assert_eq!(fx.bootstrap.run().await.expect("bootstrap"), BootstrapOutcome::Resumed);
        assert!(fx.signals.current().is_authenticated());
        fx.scheduler.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn no_callback_and_empty_store_is_signed_out() {
        let fx = fixture("http://localhost:5173/#reviews");

        assert_eq!(fx.bootstrap.run().await.expect("bootstrap"), BootstrapOutcome::SignedOut);
        assert_eq!(fx.signals.current(), SessionStatus::unauthenticated());
        assert_eq!(fx.location.href(), "http://localhost:5173/#reviews");
        assert!(!fx.scheduler.is_running().await);
    }

    #[tokio::test]
    async fn fragment_is_read_once() {
        let fx = fixture("http://localhost:5173/");
        fx.bootstrap.run().await.expect("first run");
        fx.location.set_href("http://localhost:5173/#access_token=late&expires_in=300");

        let second = fx.bootstrap.run().await.expect("second run");

        assert_eq!(second, BootstrapOutcome::AlreadyBootstrapped(SessionStatus::unauthenticated()));
        assert_eq!(fx.store.get_token(), None);
        assert_eq!(fx.location.fragment_reads(), 1);
    }

    #[tokio::test]
    async fn storage_change_transitions_both_ways() {
        let fx = fixture("http://localhost:5173/");
        assert_eq!(fx.bootstrap.on_storage_changed().await, SessionStatus::Loading);

        fx.bootstrap.run().await.expect("bootstrap");
        fx.store.set_token(AccessToken::new("from-other-view"), 300);
        assert_eq!(fx.bootstrap.on_storage_changed().await, SessionStatus::Authenticated);
        assert!(fx.scheduler.is_running().await);

        fx.store.clear();
        assert_eq!(fx.bootstrap.on_storage_changed().await, SessionStatus::unauthenticated());
        fx.scheduler.stop().await.expect("stop");
    }
}
