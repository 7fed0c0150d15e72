//! Detection configuration parameters
//!
//! [`Thresholds`] holds every tunable parameter of the fall detector.
//! [`ThresholdsPatch`] is a partial update merged into a live configuration.
//! [`MonitorSettings`] is the end-user surface: a sensitivity dial and the
//! test-mode switch.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sensitivity::DEFAULT_SENSITIVITY;

/// Slack added to the retention horizon of the sample buffer.
const RETENTION_SLACK_MS: u64 = 1000;

/// Detector thresholds.  Durations are milliseconds, magnitudes are g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    // --- Sensor ---
    /// Requested inter-sample interval.  Only used to configure the sensor.
    pub rate_ms: u32,

    // --- Magnitudes ---
    /// Magnitude that qualifies as a hard impact.
    pub impact_g: f32,
    /// Magnitude at or below which the device counts as still.
    pub stillness_g: f32,

    // --- Timing ---
    /// Settle time after an impact before stillness is analysed.
    pub impact_grace_ms: u64,
    /// Width of the trailing stillness analysis window.
    pub stillness_window_ms: u64,
    /// Cumulative still time inside the window required to confirm.
    pub stillness_min_ms: u64,
    /// Minimum time between two fall triggers.
    pub cooldown_ms: u64,
    /// How long after the grace period to keep looking for stillness.
    pub max_observe_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rate_ms: 50, // ~20 Hz

            impact_g: 8.0,
            stillness_g: 1.05, // devices idle at ~1g

            impact_grace_ms: 1200,
            stillness_window_ms: 1200,
            stillness_min_ms: 700,
            cooldown_ms: 10_000,
            max_observe_ms: 4000,
        }
    }
}

impl Thresholds {
    /// Defaults with the impact threshold replaced.
    pub fn with_impact_g(impact_g: f32) -> Self {
        Self {
            impact_g,
            ..Self::default()
        }
    }

    /// How far back the sample buffer must reach: the whole observation
    /// span plus slack, or the cooldown, whichever is longer.
    pub fn retention_ms(&self) -> u64 {
        self.impact_grace_ms
            .saturating_add(self.max_observe_ms)
            .saturating_add(self.stillness_window_ms)
            .saturating_add(RETENTION_SLACK_MS)
            .max(self.cooldown_ms)
    }

    /// Time after an impact at which the detector gives up.
    pub fn observation_deadline_ms(&self) -> u64 {
        self.impact_grace_ms.saturating_add(self.max_observe_ms)
    }

    /// Merge a partial update.  Fields absent from `patch` are unchanged.
    pub fn apply(&mut self, patch: &ThresholdsPatch) {
        if let Some(v) = patch.rate_ms {
            self.rate_ms = v;
        }
        if let Some(v) = patch.impact_g {
            self.impact_g = v;
        }
        if let Some(v) = patch.stillness_g {
            self.stillness_g = v;
        }
        if let Some(v) = patch.impact_grace_ms {
            self.impact_grace_ms = v;
        }
        if let Some(v) = patch.stillness_window_ms {
            self.stillness_window_ms = v;
        }
        if let Some(v) = patch.stillness_min_ms {
            self.stillness_min_ms = v;
        }
        if let Some(v) = patch.cooldown_ms {
            self.cooldown_ms = v;
        }
        if let Some(v) = patch.max_observe_ms {
            self.max_observe_ms = v;
        }
    }

    /// Check that the configuration makes physical sense.
    ///
    /// The detector runs with whatever it is given; this is advisory and
    /// used by the engine to warn about configurations that can never (or
    /// will always) confirm a fall.
    pub fn validate(&self) -> Result<()> {
        if self.rate_ms == 0 {
            return Err(Error::Config("rate_ms must be positive"));
        }
        if !(self.impact_g.is_finite() && self.impact_g > 0.0) {
            return Err(Error::Config("impact_g must be positive"));
        }
        if !(self.stillness_g.is_finite() && self.stillness_g > 0.0) {
            return Err(Error::Config("stillness_g must be positive"));
        }
        if self.stillness_g >= self.impact_g {
            return Err(Error::Config("stillness_g must be below impact_g"));
        }
        if self.impact_grace_ms == 0
            || self.stillness_window_ms == 0
            || self.stillness_min_ms == 0
            || self.cooldown_ms == 0
            || self.max_observe_ms == 0
        {
            return Err(Error::Config("durations must be positive"));
        }
        Ok(())
    }
}

/// Partial [`Thresholds`] update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsPatch {
    pub rate_ms: Option<u32>,
    pub impact_g: Option<f32>,
    pub stillness_g: Option<f32>,
    pub impact_grace_ms: Option<u64>,
    pub stillness_window_ms: Option<u64>,
    pub stillness_min_ms: Option<u64>,
    pub cooldown_ms: Option<u64>,
    pub max_observe_ms: Option<u64>,
}

impl ThresholdsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// End-user monitoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// 1 (least sensitive) to 10 (most sensitive).  Clamped on use.
    pub sensitivity: i32,
    /// Rehearsal mode: falls are detected but never propagated as alerts.
    pub test_mode: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            test_mode: false,
        }
    }
}
