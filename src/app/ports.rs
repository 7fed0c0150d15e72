//! Port traits: the boundary between the detection core and the platform.
//!
//! ```text
//!   SensorSource ──▶ Engine ──▶ EngineListener
//!        Clock ──────┘   └─────▶ AlertPort (via MonitorService)
//! ```
//!
//! Platform adapters (accelerometer subscription, wall clock, the alert
//! countdown) implement these traits.  The engine consumes them through
//! generics, so the core never touches a platform API directly and every
//! path is testable with mock adapters.

use super::events::EngineEvent;
use crate::engine::ReadingFeed;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: platform → engine)
// ───────────────────────────────────────────────────────────────

/// A tri-axial accelerometer that pushes readings into the engine.
///
/// Implementations may call [`ReadingFeed::push`] from any thread.
pub trait SensorSource: Send {
    /// Start delivering readings (m/s²) at roughly `rate_ms` intervals.
    ///
    /// Must fail with [`SensorError::Unavailable`] when the device has no
    /// accelerometer.
    fn subscribe(&mut self, rate_ms: u32, feed: ReadingFeed) -> Result<(), SensorError>;

    /// Stop delivering readings.  Must be idempotent.
    fn unsubscribe(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Millisecond time source used to stamp readings that arrive without a
/// timestamp of their own.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Listener port (driven adapter: engine → UI / logging / alerts)
// ───────────────────────────────────────────────────────────────

/// Receives every [`EngineEvent`].
///
/// Called on the engine worker thread; implementations should be cheap.
/// A slow listener delays detection.
pub trait EngineListener: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

impl<F> EngineListener for F
where
    F: Fn(&EngineEvent) + Send + Sync,
{
    fn on_event(&self, event: &EngineEvent) {
        self(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Alert port (driven adapter: monitor → countdown / SMS pipeline)
// ───────────────────────────────────────────────────────────────

/// Entry point of the user-facing alert flow.
///
/// Receives confirmed, non-drill falls only.  What happens next
/// (countdown, notification, SMS) is outside the detection core.
pub trait AlertPort: Send + Sync {
    fn raise_fall_alert(&self, at_ms: u64);
}
