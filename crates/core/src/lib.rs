//! # Storefront Core
//!
//! Session and token lifecycle logic - no I/O.
//!
//! This crate contains:
//! - The in-memory token store
//! - Single-flight token refresh
//! - The authenticated request gateway (401 detection, refresh-and-retry)
//! - The proactive refresh scheduler
//! - Session bootstrap from the login callback
//! - Port interfaces (traits) for the token endpoint, HTTP transport and the
//!   hosting page
//!
//! ## Architecture Principles
//! - Only depends on `storefront-common` and `storefront-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits in [`session::ports`]

pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use session::ports::{AuxiliaryStorage, Location, TokenEndpoint, Transport};
pub use session::{
    BootstrapOutcome, ProactiveRefreshScheduler, RefreshCoordinator, RequestGateway, Session,
    SessionBootstrap, SessionBuilder, SessionSignals, TickOutcome, TokenStore,
};
