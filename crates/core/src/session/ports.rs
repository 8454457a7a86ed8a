//! Port interfaces for the session lifecycle
//!
//! These traits define the boundaries between the token lifecycle logic and
//! infrastructure implementations.

use async_trait::async_trait;
use storefront_domain::{AccessToken, ApiRequest, ApiResponse, Result, TokenGrant};

/// Backend endpoint that exchanges the HttpOnly refresh credential for a new
/// access token.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Perform one exchange. Implementations must not retry.
    async fn exchange(&self) -> Result<TokenGrant>;
}

/// HTTP transport used by the request gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `bearer` as `Authorization: Bearer <token>`
    /// when present.
    ///
    /// Any HTTP status, including 401, is an `Ok` response; `Err` is reserved
    /// for failures below HTTP.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&AccessToken>,
    ) -> Result<ApiResponse>;
}

/// The address of the hosting page.
pub trait Location: Send + Sync {
    /// Full current address.
    fn href(&self) -> String;

    /// Fragment without the leading `#`, if any.
    fn fragment(&self) -> Option<String>;

    /// Remove the fragment from the address without navigating.
    fn strip_fragment(&self);

    /// Navigate away to `url`.
    fn navigate(&self, url: &str);
}

/// Per-tab scratch storage wiped on logout.
pub trait AuxiliaryStorage: Send + Sync {
    fn clear(&self);
}
