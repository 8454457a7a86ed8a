//! # Storefront Infrastructure
//!
//! Infrastructure implementations of the session ports.
//!
//! This crate contains:
//! - The shared reqwest client (timeout, cookie store)
//! - Backend adapters: request transport, token endpoint, refresh-cookie vault
//! - Configuration loading from environment and files
//! - In-process location and scratch storage
//!
//! ## Architecture
//! - Implements traits defined in `storefront-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod identity;
pub mod platform;

pub use api::HttpTransport;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use identity::{HttpTokenEndpoint, RefreshCookieVault, VaultAuthStatus};
pub use platform::{ProcessLocation, SessionScratchStorage};
