//! Error types used throughout the session lifecycle

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_domain_status_conversions;

/// Main error type for session operations.
///
/// Every variant is cheap to clone: a single refresh outcome is handed to all
/// callers that were waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum SessionError {
    /// Identity-provider configuration is absent.
    #[error("Missing required credential: {0}")]
    MissingCredential(String),

    /// Configuration is present but unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The token exchange was rejected or could not reach the backend.
    #[error("Token refresh failed: {0}")]
    RefreshFailure(String),

    /// A request needed a refresh and the refresh failed; the user must sign
    /// in again.
    #[error("Session expired: {reason}")]
    SessionExpired { reason: String },

    /// A protected endpoint still answered 401/403 after the single retry.
    #[error("Authorization failed with status {status}")]
    AuthorizationFailure { status: u16 },

    /// Non-success HTTP status returned by a typed helper.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level failure below HTTP.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Login failed and the identity provider reported it via the callback
    /// fragment.
    #[error("Authentication callback failed: {error}")]
    Callback { error: String, description: Option<String> },

    /// Response body did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of [`SessionError`] used for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionErrorKind {
    MissingCredential,
    Configuration,
    RefreshFailure,
    UnauthenticatedSession,
    AuthorizationFailure,
    Http,
    TransportFailure,
    CallbackError,
    Serialization,
}

impl_domain_status_conversions!(SessionErrorKind {
    MissingCredential => "missing_credential",
    Configuration => "configuration",
    RefreshFailure => "refresh_failure",
    UnauthenticatedSession => "unauthenticated_session",
    AuthorizationFailure => "authorization_failure",
    Http => "http",
    TransportFailure => "transport_failure",
    CallbackError => "callback_error",
    Serialization => "serialization",
});

impl SessionError {
    /// Classify the error.
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            Self::MissingCredential(_) => SessionErrorKind::MissingCredential,
            Self::Configuration(_) => SessionErrorKind::Configuration,
            Self::RefreshFailure(_) => SessionErrorKind::RefreshFailure,
            Self::SessionExpired { .. } => SessionErrorKind::UnauthenticatedSession,
            Self::AuthorizationFailure { .. } => SessionErrorKind::AuthorizationFailure,
            Self::Http { .. } => SessionErrorKind::Http,
            Self::Transport(_) | Self::Timeout(_) => SessionErrorKind::TransportFailure,
            Self::Callback { .. } => SessionErrorKind::CallbackError,
            Self::Serialization(_) => SessionErrorKind::Serialization,
        }
    }

    /// Whether the session state has been (or must be) cleared when this
    /// error surfaces.
    pub fn clears_session(&self) -> bool {
        matches!(self, Self::RefreshFailure(_) | Self::SessionExpired { .. })
    }

    /// Whether the user needs to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailure(_) | Self::SessionExpired { .. } | Self::Callback { .. }
        )
    }

    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::AuthorizationFailure { status },
            _ => Self::Http { status, message: message.into() },
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingCredential(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingCredential(var) => Self::MissingCredential(var),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
