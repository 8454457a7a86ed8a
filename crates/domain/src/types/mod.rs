//! Domain types and models

pub mod callback;
pub mod request;
pub mod session;
pub mod token;

pub use callback::CallbackFragment;
pub use request::{ApiRequest, ApiResponse, HttpMethod};
pub use session::{SessionStatus, TokenDiagnostics};
pub use token::{AccessToken, TokenGrant};
