//! Refresh-cookie token exchange

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use storefront_core::TokenEndpoint;
use storefront_domain::constants::REFRESH_PATH;
use storefront_domain::{Result, SessionError, TokenGrant};
use tracing::{debug, instrument};
use url::Url;

use crate::http::{endpoint_url, into_api_response, HttpClient};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// `POST /api/auth/refresh`, authenticated by the HttpOnly refresh cookie
/// held in the client's cookie store.
pub struct HttpTokenEndpoint {
    http: HttpClient,
    url: Url,
}

impl HttpTokenEndpoint {
    /// # Errors
    /// Returns [`SessionError::Configuration`] for an invalid base URL.
    pub fn new(http: HttpClient, base_url: &Url) -> Result<Self> {
        Ok(Self { http, url: endpoint_url(base_url, REFRESH_PATH)? })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    #[instrument(skip(self))]
    async fn exchange(&self) -> Result<TokenGrant> {
        let response = self.http.send(self.http.request(Method::POST, self.url.clone())).await?;
        let response = into_api_response(response).await?;

        if !response.is_success() {
            let reason = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error.or(body.message))
                .unwrap_or_else(|| format!("token endpoint returned HTTP {}", response.status()));
            debug!(status = response.status(), %reason, "refresh rejected");
            return Err(SessionError::RefreshFailure(reason));
        }

        response.json::<TokenGrant>().map_err(|err| {
            SessionError::RefreshFailure(format!("invalid token response: {err}"))
        })
    }
}
