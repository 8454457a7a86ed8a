use std::sync::Arc;

use storefront_core::Session;
use storefront_domain::SessionConfig;
use storefront_infra::{
    HttpClient, HttpTokenEndpoint, HttpTransport, ProcessLocation, SessionScratchStorage,
};
use url::Url;
use wiremock::MockServer;

/// A [`Session`] wired to real HTTP adapters pointed at a mock backend.
pub struct HttpSession {
    pub session: Arc<Session>,
    pub http: HttpClient,
    pub location: Arc<ProcessLocation>,
    pub storage: Arc<SessionScratchStorage>,
}

impl HttpSession {
    pub fn new(server: &MockServer, href: &str) -> Self {
        let base = Url::parse(&server.uri()).expect("mock server uri");
        let http = HttpClient::new().expect("http client");
        let transport = HttpTransport::new(http.clone(), base.as_str()).expect("transport");
        let endpoint = HttpTokenEndpoint::new(http.clone(), &base).expect("token endpoint");
        let location = Arc::new(ProcessLocation::new(href));
        let storage = Arc::new(SessionScratchStorage::new());

        let session = Session::builder()
            .api_base(base.as_str())
            .config(SessionConfig::default())
            .token_endpoint(Arc::new(endpoint))
            .transport(Arc::new(transport))
            .location(location.clone())
            .storage(storage.clone())
            .build()
            .expect("session");

        Self { session: Arc::new(session), http, location, storage }
    }
}
