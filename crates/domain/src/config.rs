//! Configuration structures
//!
//! Loaded by `storefront-infra::config` from the environment or a TOML/JSON
//! file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_APP_URL, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REFRESH_THRESHOLD_SECS,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// External identity provider (Keycloak-style realm).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

impl IdentityConfig {
    /// Authorization endpoint of the realm.
    pub fn authorization_endpoint(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/auth",
            self.url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_app_url")]
    pub app_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            app_url: default_app_url(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Token lifecycle tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Refresh when fewer than this many seconds of validity remain.
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_seconds: u64,
    /// Period of the proactive refresh check.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_seconds: u64,
    /// Enables [`crate::TokenDiagnostics`] introspection.
    #[serde(default)]
    pub debug_mode: bool,
}

impl SessionConfig {
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_threshold_seconds: DEFAULT_REFRESH_THRESHOLD_SECS,
            refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
            debug_mode: false,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_app_url() -> String {
    DEFAULT_APP_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_refresh_threshold_secs() -> u64 {
    DEFAULT_REFRESH_THRESHOLD_SECS
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}
