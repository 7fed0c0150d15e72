//! Log-based adapters.
//!
//! [`LogListener`] writes engine events to the `log` facade and
//! [`LogAlert`] stands in for the alert countdown on hosts that have none.
//! A notification or SMS adapter would implement the same traits.

use core::sync::atomic::{AtomicU32, Ordering};

use log::{debug, info, warn};

use crate::app::events::EngineEvent;
use crate::app::ports::{AlertPort, EngineListener};

/// Listener that logs every [`EngineEvent`].
///
/// Samples are logged at `debug`; impacts and falls at `info`.
#[derive(Debug, Default)]
pub struct LogListener;

impl LogListener {
    pub fn new() -> Self {
        Self
    }
}

impl EngineListener for LogListener {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Sample { g, ts } => {
                debug!("SAMPLE | g={g:.3} | ts={ts}");
            }
            EngineEvent::Impact { g, ts, impact_g } => {
                info!("IMPACT | g={g:.2} >= {impact_g:.2} | ts={ts}");
            }
            EngineEvent::Fall { ts } => {
                info!("FALL   | confirmed | ts={ts}");
            }
        }
    }
}

/// Alert port that only logs and counts alerts.
#[derive(Debug, Default)]
pub struct LogAlert {
    raised: AtomicU32,
}

impl LogAlert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts raised so far.
    pub fn raised(&self) -> u32 {
        self.raised.load(Ordering::Relaxed)
    }
}

impl AlertPort for LogAlert {
    fn raise_fall_alert(&self, at_ms: u64) {
        let n = self.raised.fetch_add(1, Ordering::Relaxed) + 1;
        warn!("ALERT  | fall alert #{n} raised | ts={at_ms}");
    }
}
