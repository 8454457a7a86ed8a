//! # Storefront App
//!
//! Application layer - commands, context and entry point.
//!
//! This crate contains:
//! - Commands the UI calls into (session, profile, health)
//! - Application context (dependency injection)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the session ports to their HTTP and in-process adapters

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::*;
pub use context::*;
