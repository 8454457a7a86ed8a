//! Access token types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TOKEN_TTL_SECS, TOKEN_PREVIEW_LEN, TOKEN_PREVIEW_SUFFIX};

/// Opaque bearer credential.
///
/// `Debug` never prints the value; use [`AccessToken::preview`] for logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// First characters of the token followed by an ellipsis.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(TOKEN_PREVIEW_LEN).collect();
        format!("{head}{TOKEN_PREVIEW_SUFFIX}")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(len={})", self.0.len())
    }
}

/// Successful answer of the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self { access_token: access_token.into(), expires_in }
    }

    /// Token and lifetime, or `None` if the grant is unusable (empty token,
    /// non-positive lifetime or one above [`MAX_TOKEN_TTL_SECS`]).
    pub fn validated(&self) -> Option<(AccessToken, u64)> {
        let ttl = u64::try_from(self.expires_in)
            .ok()
            .filter(|ttl| (1..=MAX_TOKEN_TTL_SECS).contains(ttl))?;
        if self.access_token.is_empty() {
            return None;
        }
        Some((AccessToken::new(self.access_token.clone()), ttl))
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &format_args!("<{} chars>", self.access_token.len()))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
