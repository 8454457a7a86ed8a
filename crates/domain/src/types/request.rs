//! Transport-neutral request and response types

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Result, SessionError};
use crate::impl_domain_status_conversions;

/// HTTP verbs used against the storefront backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_domain_status_conversions!(HttpMethod {
    Get => "get",
    Post => "post",
    Put => "put",
    Patch => "patch",
    Delete => "delete",
});

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A request addressed to the backend, relative to the API base URL.
///
/// The bearer credential is not part of the request; the gateway supplies it
/// at dispatch time so a retry can carry a different token.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), headers: Vec::new(), body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns [`SessionError::Serialization`] if `body` cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        Ok(self.with_body(serde_json::to_value(body)?))
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Response as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401: the credential was missing, expired or revoked.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns [`SessionError::Serialization`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(SessionError::from)
    }

    /// Decode a successful body, or map the status to an error.
    ///
    /// # Errors
    /// Returns [`SessionError::AuthorizationFailure`] for 401/403,
    /// [`SessionError::Http`] for other non-success statuses and
    /// [`SessionError::Serialization`] for undecodable bodies.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(SessionError::from_status(self.status, self.text()));
        }
        self.json()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Cart {
        items: u32,
    }

    #[test]
    fn request_builder_accumulates_parts() {
        let request = ApiRequest::get("/api/products")
            .with_query("page", "2")
            .with_header("X-Trace", "abc");

        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "/api/products");
        assert_eq!(request.query(), &[("page".to_string(), "2".to_string())]);
        assert_eq!(request.headers().len(), 1);
        assert!(request.body().is_none());
    }

    #[test]
    fn json_body_is_encoded() {
        let request = ApiRequest::post("/api/cart").with_json(&json!({"sku": "A1"})).expect("encode");
        assert_eq!(request.body(), Some(&json!({"sku": "A1"})));
        assert_eq!(request.method().as_str(), "POST");
        assert_eq!(request.method().to_string(), "post");
    }

    #[test]
    fn into_json_maps_statuses() {
        let ok = ApiResponse::new(200, br#"{"items":3}"#.to_vec());
        assert_eq!(ok.into_json::<Cart>(), Ok(Cart { items: 3 }));

        let denied = ApiResponse::new(401, b"nope".to_vec());
        assert_eq!(
            denied.into_json::<Cart>(),
            Err(SessionError::AuthorizationFailure { status: 401 })
        );

        let broken = ApiResponse::new(502, b"bad gateway".to_vec());
        assert!(matches!(broken.into_json::<Cart>(), Err(SessionError::Http { status: 502, .. })));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = ApiResponse::new(204, Vec::new())
            .with_headers(vec![("Content-Type".into(), "application/json".into())]);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(response.is_success());
        assert!(!response.is_unauthorized());
    }
}
