//! # Storefront Domain
//!
//! Domain types for the storefront client session lifecycle.
//!
//! This crate contains:
//! - Token, request/response and session status types
//! - Session error types and Result definitions
//! - Configuration structures
//! - Endpoint paths and tuning constants
//!
//! ## Architecture
//! - No dependencies on other storefront crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
