//! Login callback fragment
//!
//! After sign-in the backend redirects to the application with the outcome in
//! the URL fragment, either
//! `#access_token=<opaque>&expires_in=<seconds>` or
//! `#error=<code>&error_description=<text>`.

use url::form_urlencoded;

use crate::constants::{
    FRAGMENT_ACCESS_TOKEN, FRAGMENT_ERROR, FRAGMENT_ERROR_DESCRIPTION, FRAGMENT_EXPIRES_IN,
    MAX_TOKEN_TTL_SECS,
};
use crate::errors::SessionError;
use crate::types::token::AccessToken;

/// Recognized callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackFragment {
    /// Token delivered with a positive lifetime.
    Token { access_token: AccessToken, expires_in: u64 },
    /// The identity provider reported a failure.
    Error { error: String, description: Option<String> },
    /// A token was present but its lifetime was missing or not positive.
    Malformed { reason: String },
}

impl CallbackFragment {
    /// Parse a location fragment (with or without the leading `#`).
    ///
    /// Returns `None` when the fragment carries neither a token nor an error
    /// marker. An error marker wins over a token in the same fragment.
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if fragment.is_empty() {
            return None;
        }

        let mut access_token = None;
        let mut expires_in = None;
        let mut error = None;
        let mut description = None;
        for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                FRAGMENT_ACCESS_TOKEN => access_token = Some(value.into_owned()),
                FRAGMENT_EXPIRES_IN => expires_in = Some(value.into_owned()),
                FRAGMENT_ERROR => error = Some(value.into_owned()),
                FRAGMENT_ERROR_DESCRIPTION => description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Some(Self::Error { error, description });
        }

        let access_token = access_token?;
        if access_token.is_empty() {
            return Some(Self::Malformed { reason: "empty access token".to_string() });
        }
        let ttl = expires_in.as_deref().map(str::parse::<i64>);
        match ttl {
            Some(Ok(ttl)) if ttl > 0 && ttl.unsigned_abs() <= MAX_TOKEN_TTL_SECS => {
                Some(Self::Token {
                    access_token: AccessToken::new(access_token),
                    expires_in: ttl.unsigned_abs(),
                })
            }
            Some(Ok(ttl)) if ttl > 0 => {
                Some(Self::Malformed { reason: format!("expires_in out of range: {ttl}") })
            }
            Some(Ok(ttl)) => {
                Some(Self::Malformed { reason: format!("non-positive expires_in: {ttl}") })
            }
            Some(Err(_)) => Some(Self::Malformed { reason: "unparseable expires_in".to_string() }),
            None => Some(Self::Malformed { reason: "missing expires_in".to_string() }),
        }
    }

    /// The error to surface for a non-token callback.
    pub fn to_error(&self) -> Option<SessionError> {
        match self {
            Self::Token { .. } => None,
            Self::Error { error, description } => {
                Some(SessionError::Callback { error: error.clone(), description: description.clone() })
            }
            Self::Malformed { reason } => Some(SessionError::Callback {
                error: "malformed_callback".to_string(),
                description: Some(reason.clone()),
            }),
        }
    }
}
