//! Clock abstraction
//!
//! Token expiry is computed against a [`Clock`] so that tests can move time
//! forward without sleeping.
//!
//! ```
//! use std::time::Duration;
//!
//! use storefront_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(90));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(90));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic instant, used for expiry arithmetic.
    fn now(&self) -> Instant;

    /// Wall-clock time, used only for display.
    fn system_time(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch.
    fn millis_since_epoch(&self) -> u64 {
        let millis =
            self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }

    /// Wall-clock equivalent of a monotonic instant.
    fn system_time_at(&self, instant: Instant) -> SystemTime {
        let now = self.now();
        let wall = self.system_time();
        if instant >= now {
            wall + (instant - now)
        } else {
            wall.checked_sub(now - instant).unwrap_or(UNIX_EPOCH)
        }
    }
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones share the same elapsed time, so a clone handed to the code under
/// test follows every `advance` made by the test.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    wall_origin: SystemTime,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: SystemTime::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.offset.lock() += duration;
    }

    /// Set the absolute elapsed time since creation.
    pub fn set_elapsed(&self, duration: Duration) {
        *self.offset.lock() = duration;
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.wall_origin + self.elapsed()
    }
}
