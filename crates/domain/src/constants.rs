//! Application constants
//!
//! Backend endpoint paths and session tuning defaults.

// Backend endpoints (relative to the API base URL)
pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const LOGOUT_REDIRECT_PATH: &str = "/api/auth/logout-redirect";
pub const HEALTH_PATH: &str = "/api/auth/health";
pub const PROFILE_PATH: &str = "/api/auth/profile";
pub const VAULT_REFRESH_TOKEN_PATH: &str = "/api/secure/tokens/refresh";
pub const VAULT_STATUS_PATH: &str = "/api/secure/tokens/status";

/// Query parameter carrying the post-login return address.
pub const REDIRECT_URI_PARAM: &str = "redirect_uri";

// Session tuning
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 120;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Longest token lifetime accepted from a grant or callback (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

// Defaults for local development
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8083";
pub const DEFAULT_APP_URL: &str = "http://localhost:5173/";

// Diagnostics
pub const TOKEN_PREVIEW_LEN: usize = 20;
pub const TOKEN_PREVIEW_SUFFIX: &str = "...";

// Callback fragment keys
pub const FRAGMENT_ACCESS_TOKEN: &str = "access_token";
pub const FRAGMENT_EXPIRES_IN: &str = "expires_in";
pub const FRAGMENT_ERROR: &str = "error";
pub const FRAGMENT_ERROR_DESCRIPTION: &str = "error_description";

/// User agent sent by the HTTP adapters.
pub const USER_AGENT: &str = concat!("storefront-session/", env!("CARGO_PKG_VERSION"));
