//! Wall-clock access, swappable in tests

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type UnixMillis = u64;

/// Represents a clock, which can tell the current time
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> UnixMillis;
}

/// The system clock as provided by `std::time::SystemTime`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> UnixMillis {
        // A clock set before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as UnixMillis)
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub use manual::ManualClock;
