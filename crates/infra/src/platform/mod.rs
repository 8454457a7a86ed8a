//! In-process implementations of the page-level ports
//!
//! A native host has no address bar or tab storage; these adapters keep the
//! equivalent state in memory and report navigations through logging.

pub mod location;
pub mod storage;

pub use location::ProcessLocation;
pub use storage::SessionScratchStorage;
