use std::time::Duration;

use storefront_domain::SessionError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug";

/// Set to `1`/`true` to emit JSON log lines.
pub const LOG_JSON_ENV: &str = "STOREFRONT_LOG_JSON";

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_JSON_ENV)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if installed.is_ok() {
        info!(json, "tracing initialised");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, outcome: Result<(), &str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(command, duration_ms, "command_execution_success"),
        Err(error_type) => warn!(command, duration_ms, error_type, "command_execution_failure"),
    }
}

/// Stable label for an error, suitable for logging.
#[inline]
pub fn error_label(error: &SessionError) -> String {
    error.kind().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_label_uses_kind() {
        assert_eq!(error_label(&SessionError::RefreshFailure("x".into())), "refresh_failure");
        assert_eq!(
            error_label(&SessionError::SessionExpired { reason: "x".into() }),
            "unauthenticated_session"
        );
        assert_eq!(error_label(&SessionError::Timeout(Duration::from_secs(1))), "transport_failure");
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
