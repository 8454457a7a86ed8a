//! Session status and diagnostics

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable authentication state of the running application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Bootstrap has not finished.
    #[default]
    Loading,
    Authenticated,
    Unauthenticated {
        /// Why the session ended, when known (refresh failure, callback error).
        reason: Option<String>,
    },
}

impl SessionStatus {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated { reason: None }
    }

    pub fn unauthenticated_because(reason: impl Into<String>) -> Self {
        Self::Unauthenticated { reason: Some(reason.into()) }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Unauthenticated { reason: None } => f.write_str("unauthenticated"),
            Self::Unauthenticated { reason: Some(reason) } => {
                write!(f, "unauthenticated ({reason})")
            }
        }
    }
}

/// Debug-only view of the token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDiagnostics {
    pub has_token: bool,
    pub token_length: usize,
    /// First characters of the token, never the full value.
    pub token_preview: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub time_until_expiry_secs: u64,
    pub is_expired: bool,
    pub is_near_expiry: bool,
    pub is_authenticated: bool,
    pub refresh_in_flight: bool,
}
