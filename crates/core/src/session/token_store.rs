//! In-memory access token store
//!
//! The token lives only in process memory. Expiry is lazy and sticky: the
//! first read at or after the expiry instant clears the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use storefront_common::time::{Clock, SystemClock};
use storefront_domain::constants::MAX_TOKEN_TTL_SECS;
use storefront_domain::{AccessToken, TokenDiagnostics};
use tracing::debug;

#[derive(Default)]
struct StoredToken {
    token: Option<AccessToken>,
    expires_at: Option<Instant>,
}

impl StoredToken {
    fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.map_or(Duration::ZERO, |at| at.saturating_duration_since(now))
    }

    fn is_valid(&self, now: Instant) -> bool {
        self.token.is_some() && self.expires_at.is_some_and(|at| now < at)
    }
}

/// Holds the current access token and its expiry instant.
pub struct TokenStore {
    clock: Arc<dyn Clock>,
    state: RwLock<StoredToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock, state: RwLock::new(StoredToken::default()) }
    }

    /// Store `token`, valid for `ttl_seconds` from now. Overwrites any
    /// previous token. Lifetimes above [`MAX_TOKEN_TTL_SECS`] are clamped.
    pub fn set_token(&self, token: AccessToken, ttl_seconds: u64) {
        let now = self.clock.now();
        let ttl = Duration::from_secs(ttl_seconds.min(MAX_TOKEN_TTL_SECS));
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        let mut state = self.state.write();
        if state.expires_at.is_some_and(|previous| expires_at < previous) {
            debug!(ttl_seconds, "new token expires before the one it replaces");
        }
        state.token = Some(token);
        state.expires_at = Some(expires_at);
    }

    /// Current token, or `None` if absent or expired. An expired token is
    /// cleared as a side effect.
    pub fn get_token(&self) -> Option<AccessToken> {
        let now = self.clock.now();
        {
            let state = self.state.read();
            if state.is_valid(now) {
                return state.token.clone();
            }
            if state.token.is_none() && state.expires_at.is_none() {
                return None;
            }
        }

        let mut state = self.state.write();
        if state.is_valid(now) {
            return state.token.clone();
        }
        debug!("access token expired; clearing");
        *state = StoredToken::default();
        None
    }

    /// Whether fewer than `threshold` remain before expiry. Always true when
    /// the store is empty.
    pub fn is_near_expiry(&self, threshold: Duration) -> bool {
        self.state.read().remaining(self.clock.now()) < threshold
    }

    /// Whether the expiry instant has been reached (or no token is held).
    pub fn is_expired(&self) -> bool {
        let state = self.state.read();
        !state.is_valid(self.clock.now())
    }

    /// Whether a valid token is held.
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// Whole seconds until expiry, zero when empty or expired.
    pub fn time_until_expiry(&self) -> u64 {
        self.state.read().remaining(self.clock.now()).as_secs()
    }

    pub fn clear(&self) {
        *self.state.write() = StoredToken::default();
    }

    /// Read-only view for debugging. Never clears an expired token.
    pub fn snapshot(&self, threshold: Duration) -> TokenDiagnostics {
        let now = self.clock.now();
        let state = self.state.read();
        let remaining = state.remaining(now);
        let is_valid = state.is_valid(now);

        TokenDiagnostics {
            has_token: state.token.is_some(),
            token_length: state.token.as_ref().map_or(0, AccessToken::len),
            token_preview: state.token.as_ref().map(AccessToken::preview),
            expires_at: state
                .expires_at
                .map(|at| DateTime::<Utc>::from(self.clock.system_time_at(at))),
            time_until_expiry_secs: remaining.as_secs(),
            is_expired: !is_valid,
            is_near_expiry: remaining < threshold,
            is_authenticated: is_valid,
            refresh_in_flight: false,
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}
