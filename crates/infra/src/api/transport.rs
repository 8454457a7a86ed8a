//! reqwest-backed transport for the request gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use storefront_core::Transport;
use storefront_domain::constants::HEALTH_PATH;
use storefront_domain::{AccessToken, ApiRequest, ApiResponse, HttpMethod, Result, SessionError};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::http::{endpoint_url, HttpClient};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends [`ApiRequest`]s to the storefront backend.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: Url,
}

impl HttpTransport {
    /// # Errors
    /// Returns [`SessionError::Configuration`] if `base_url` is not a valid
    /// absolute URL.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| SessionError::Configuration(format!("invalid API base URL: {err}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probe `GET /api/auth/health`.
    ///
    /// Returns `Ok(false)` for a non-success status.
    ///
    /// # Errors
    /// Returns [`SessionError::Timeout`] if the backend does not answer
    /// within five seconds, or the transport error otherwise.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoint_url(&self.base_url, HEALTH_PATH)?;
        debug!(url = %url, "Health check");

        let response =
            tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.http.send(self.http.request(Method::GET, url)))
                .await
                .map_err(|_| {
                    warn!("Health check timeout");
                    SessionError::Timeout(HEALTH_CHECK_TIMEOUT)
                })?;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("API is healthy");
                Ok(true)
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "API returned non-success status");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "Health check failed");
                Err(err)
            }
        }
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let mut url = endpoint_url(&self.base_url, request.path())?;
        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }

        let mut builder = self.http.request(reqwest_method(request.method()), url);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        self.http.send_buffered(builder).await
    }
}
