//! Session and token lifecycle
//!
//! Leaf-first: [`token_store`] ← [`refresh`] ← [`scheduler`] / [`gateway`] ←
//! [`bootstrap`] ← [`service`].

pub mod bootstrap;
pub mod gateway;
pub mod ports;
pub mod refresh;
pub mod scheduler;
pub mod service;
pub mod signals;
pub mod token_store;

pub use bootstrap::{BootstrapOutcome, SessionBootstrap};
pub use gateway::RequestGateway;
pub use refresh::RefreshCoordinator;
pub use scheduler::{ProactiveRefreshScheduler, SchedulerConfig, TickOutcome};
pub use service::{Session, SessionBuilder};
pub use signals::SessionSignals;
pub use token_store::TokenStore;
