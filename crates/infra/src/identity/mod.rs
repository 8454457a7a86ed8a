//! Adapters for the backend's authentication endpoints

pub mod cookie_vault;
pub mod token_endpoint;

pub use cookie_vault::{RefreshCookieVault, VaultAuthStatus};
pub use token_endpoint::HttpTokenEndpoint;
