//! Testing utilities
//!
//! - **[`async_utils`]**: timeouts, polling and the
//!   [`assert_eventually_async!`](crate::assert_eventually_async) macro

pub mod async_utils;

pub use async_utils::{poll_until, timeout_ok};
