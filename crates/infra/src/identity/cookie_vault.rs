//! Refresh-token cookie vault
//!
//! Alternate integration for logins completed directly against the identity
//! provider: the client hands the refresh token to the backend, which keeps
//! it in an HttpOnly cookie. Every operation degrades to `false` on failure.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_core::TokenStore;
use storefront_domain::constants::{VAULT_REFRESH_TOKEN_PATH, VAULT_STATUS_PATH};
use storefront_domain::{AccessToken, Result, SessionError};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::http::{endpoint_url, into_api_response, HttpClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultStatusBody {
    #[serde(default)]
    has_refresh_token: bool,
}

/// Combined view of the in-memory access token and the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAuthStatus {
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    pub is_authenticated: bool,
}

pub struct RefreshCookieVault {
    http: HttpClient,
    token_url: Url,
    status_url: Url,
}

impl RefreshCookieVault {
    /// # Errors
    /// Returns [`SessionError::Configuration`] for an invalid base URL.
    pub fn new(http: HttpClient, base_url: &Url) -> Result<Self> {
        Ok(Self {
            http,
            token_url: endpoint_url(base_url, VAULT_REFRESH_TOKEN_PATH)?,
            status_url: endpoint_url(base_url, VAULT_STATUS_PATH)?,
        })
    }

    /// Hand `refresh_token` to the backend to be kept as an HttpOnly cookie.
    #[instrument(skip_all)]
    pub async fn store_refresh_token(&self, refresh_token: &str) -> bool {
        let request = self
            .http
            .request(Method::POST, self.token_url.clone())
            .json(&json!({ "refreshToken": refresh_token }));
        match self.expect_success(request).await {
            Ok(()) => {
                info!("refresh token stored in cookie vault");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to store refresh token");
                false
            }
        }
    }

    /// Ask the backend to drop the refresh cookie.
    #[instrument(skip_all)]
    pub async fn clear_refresh_token(&self) -> bool {
        let request = self.http.request(Method::DELETE, self.token_url.clone());
        match self.expect_success(request).await {
            Ok(()) => {
                info!("refresh token cookie cleared");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to clear refresh token");
                false
            }
        }
    }

    /// Whether the backend holds a refresh cookie for this client.
    #[instrument(skip_all)]
    pub async fn has_refresh_token(&self) -> bool {
        let request = self.http.request(Method::GET, self.status_url.clone());
        let response = match self.http.send_buffered(request).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!(status = response.status(), "vault status unavailable");
                return false;
            }
            Err(err) => {
                warn!(error = %err, "failed to check refresh token");
                return false;
            }
        };
        match response.json::<VaultStatusBody>() {
            Ok(body) => body.has_refresh_token,
            Err(err) => {
                warn!(error = %err, "unreadable vault status");
                false
            }
        }
    }

    /// Store the access token in memory and the refresh token in the vault.
    ///
    /// Returns whether the vault accepted the refresh token.
    pub async fn setup_after_login(
        &self,
        store: &TokenStore,
        access_token: AccessToken,
        expires_in: u64,
        refresh_token: &str,
    ) -> bool {
        store.set_token(access_token, expires_in);
        self.store_refresh_token(refresh_token).await
    }

    /// Clear the vault, then the in-memory token regardless of the outcome.
    pub async fn logout(&self, store: &TokenStore) {
        self.clear_refresh_token().await;
        store.clear();
    }

    pub async fn check_status(&self, store: &TokenStore) -> VaultAuthStatus {
        let has_access_token = store.is_authenticated();
        let has_refresh_token = self.has_refresh_token().await;
        VaultAuthStatus {
            has_access_token,
            has_refresh_token,
            is_authenticated: has_access_token && has_refresh_token,
        }
    }

    async fn expect_success(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = into_api_response(self.http.send(request).await?).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(SessionError::from_status(response.status(), response.text()))
        }
    }
}
