//! Conversions from external infrastructure errors into session errors.

use reqwest::Error as HttpError;
use storefront_domain::SessionError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SessionError);

impl From<InfraError> for SessionError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SessionError> for InfraError {
    fn from(value: SessionError) -> Self {
        InfraError(value)
    }
}

trait IntoSessionError {
    fn into_session(self) -> SessionError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SessionError */
/* -------------------------------------------------------------------------- */

impl IntoSessionError for HttpError {
    fn into_session(self) -> SessionError {
        if self.is_timeout() {
            return SessionError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SessionError::Transport("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return SessionError::from_status(code, message);
        }

        if self.is_decode() {
            return SessionError::Serialization(self.to_string());
        }

        SessionError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_session())
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(SessionError::Configuration(format!("invalid URL: {value}")))
    }
}
