//! Host clock adapters.
//!
//! - [`MonotonicClock`] counts milliseconds since construction using
//!   `std::time::Instant`.  Default for the engine.
//! - [`SystemClock`] reports milliseconds since the Unix epoch, matching
//!   timestamps produced by platform sensor stacks that stamp readings
//!   with wall time.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::Clock;

/// Milliseconds since this clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock milliseconds since the Unix epoch.
///
/// A clock set before 1970 reads as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}
