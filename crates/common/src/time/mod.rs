//! Time utilities
//!
//! - **[`clock`]**: real and mock clocks behind the [`Clock`] trait
//! - **[`format`]**: human-readable durations for logs

pub mod clock;
pub mod format;

pub use clock::{Clock, MockClock, SystemClock};
pub use format::{format_duration, format_remaining};
