//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the identity variables are missing, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STOREFRONT_IDENTITY_URL`: Identity provider base URL (required)
//! - `STOREFRONT_IDENTITY_REALM`: Identity provider realm (required)
//! - `STOREFRONT_IDENTITY_CLIENT_ID`: Public client id (required)
//! - `STOREFRONT_API_BASE_URL`: Backend base URL
//! - `STOREFRONT_APP_URL`: Address the application is served from
//! - `STOREFRONT_HTTP_TIMEOUT_SECS`: Request timeout in seconds
//! - `STOREFRONT_REFRESH_THRESHOLD_SECS`: Proactive refresh threshold
//! - `STOREFRONT_REFRESH_INTERVAL_SECS`: Proactive refresh check period
//! - `STOREFRONT_DEBUG`: Enables token diagnostics (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./storefront.{toml,json}` and `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use storefront_domain::{ApiConfig, Config, ConfigError, IdentityConfig, SessionConfig};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["storefront.toml", "storefront.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns the environment error when it is not about a missing variable,
/// otherwise the file error.
pub fn load() -> Result<Config, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::MissingCredential(var)) => {
            tracing::debug!(missing = %var, "Identity variables incomplete, trying file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns [`ConfigError::MissingCredential`] naming the first missing
/// identity variable, or [`ConfigError::InvalidValue`] for unparseable
/// numbers.
pub fn load_from_env() -> Result<Config, ConfigError> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Build configuration from an arbitrary variable source.
///
/// # Errors
/// See [`load_from_env`].
pub fn load_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(key.to_string()))
    };

    let identity = IdentityConfig {
        url: required("STOREFRONT_IDENTITY_URL")?,
        realm: required("STOREFRONT_IDENTITY_REALM")?,
        client_id: required("STOREFRONT_IDENTITY_CLIENT_ID")?,
    };

    let api_defaults = ApiConfig::default();
    let api = ApiConfig {
        base_url: lookup("STOREFRONT_API_BASE_URL").unwrap_or(api_defaults.base_url),
        app_url: lookup("STOREFRONT_APP_URL").unwrap_or(api_defaults.app_url),
        timeout_seconds: parse_or(
            &lookup,
            "STOREFRONT_HTTP_TIMEOUT_SECS",
            api_defaults.timeout_seconds,
        )?,
    };

    let session_defaults = SessionConfig::default();
    let session = SessionConfig {
        refresh_threshold_seconds: parse_or(
            &lookup,
            "STOREFRONT_REFRESH_THRESHOLD_SECS",
            session_defaults.refresh_threshold_seconds,
        )?,
        refresh_interval_seconds: parse_or(
            &lookup,
            "STOREFRONT_REFRESH_INTERVAL_SECS",
            session_defaults.refresh_interval_seconds,
        )?,
        debug_mode: lookup("STOREFRONT_DEBUG").map_or(session_defaults.debug_mode, |s| parse_bool(&s)),
    };

    validate(Config { identity, api, session })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns [`ConfigError::NotFound`] if no file exists and
/// [`ConfigError::Parse`] if the file cannot be read or parsed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::NotFound("no config file in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::Parse(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns [`ConfigError::Parse`] if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Parse(format!("Invalid JSON format: {e}")))?,
        _ => return Err(ConfigError::Parse(format!("Unsupported config format: {extension}"))),
    };
    validate(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn validate(config: Config) -> Result<Config, ConfigError> {
    for (key, value) in [
        ("identity.url", &config.identity.url),
        ("identity.realm", &config.identity.realm),
        ("identity.client_id", &config.identity.client_id),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingCredential(key.to_string()));
        }
    }

    url::Url::parse(&config.api.base_url).map_err(|e| ConfigError::InvalidValue {
        key: "api.base_url".to_string(),
        reason: e.to_string(),
    })?;

    if config.session.refresh_interval_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            key: "session.refresh_interval_seconds".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(config)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
