//! Shared utilities for the storefront crates.
//!
//! # Feature Tiers
//!
//! - `runtime`: clock abstraction ([`time::Clock`]) and duration formatting
//! - `test-utils`: async assertions and polling helpers for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[cfg(feature = "runtime")]
pub mod time;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
