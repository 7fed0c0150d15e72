//! Outbound engine events.
//!
//! The [`Engine`](crate::engine::Engine) publishes these to every
//! [`EngineListener`](super::ports::EngineListener).  Listeners decide what
//! to do with them: draw a live trace, log, or start the alert countdown.

use serde::Serialize;

/// Events derived from the sensor stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineEvent {
    /// Every processed reading.
    Sample { g: f32, ts: u64 },

    /// A reading at or above the configured impact threshold.
    Impact { g: f32, ts: u64, impact_g: f32 },

    /// The detector confirmed a fall.  Never published in test mode.
    Fall { ts: u64 },
}

impl EngineEvent {
    /// Timestamp (ms) carried by every variant.
    pub fn ts(&self) -> u64 {
        match self {
            Self::Sample { ts, .. } | Self::Impact { ts, .. } | Self::Fall { ts } => *ts,
        }
    }

    pub fn is_fall(&self) -> bool {
        matches!(self, Self::Fall { .. })
    }
}
