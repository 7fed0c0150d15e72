//! Fall detector: a two-phase streaming state machine.
//!
//! ```text
//!  IDLE ──[g ≥ impact_g]──▶ AFTER_IMPACT
//!    ▲                          │
//!    ├──[stillness confirmed]───┤  (reports FallConfirmed, starts cooldown)
//!    │                          │
//!    └──[grace + max_observe]───┘  (silent timeout)
//!
//!  Any phase is frozen while now - last_trigger < cooldown_ms.
//! ```
//!
//! The detector owns no thread and performs no I/O.  It must be driven by a
//! single caller with non-decreasing timestamps; the engine guarantees this
//! by confining it to one worker thread.  Each call to
//! [`Detector::on_sample`] returns a [`Detection`] describing what, if
//! anything, the sample caused.

pub mod window;

use log::debug;

use crate::config::{Thresholds, ThresholdsPatch};
use window::{Sample, SampleWindow};

/// Samples younger than this survive the post-fall trim.
const RETRIGGER_GUARD_MS: u64 = 300;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Detector phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for an impact.
    Idle,
    /// An impact was seen; looking for stillness.
    AfterImpact,
}

/// Read-only introspection snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorState {
    pub phase: Phase,
    /// Timestamp of the last confirmed fall, 0 if none yet.
    pub last_trigger: u64,
    /// Timestamp of the most recent impact, 0 if none yet.
    pub impact_at: u64,
}

/// Outcome of feeding one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// No state change.
    Nothing,
    /// IDLE → AFTER_IMPACT.
    ImpactDetected,
    /// Stillness followed an impact.  Reported exactly once per fall.
    FallConfirmed,
    /// AFTER_IMPACT → IDLE because no stillness appeared in time.
    ObservationExpired,
}

/// Behaviour the engine needs from a detector.
///
/// The engine builds its detector through a caller-supplied factory, so
/// tests can substitute a scripted fake.
pub trait Detector: Send {
    /// Advance the state machine by one sample.
    fn on_sample(&mut self, g: f32, now_ms: u64) -> Detection;

    /// Back to IDLE with an empty buffer and no cooldown.
    fn reset(&mut self);

    /// Merge a partial threshold update; applies from the next sample.
    fn set_thresholds(&mut self, patch: &ThresholdsPatch);

    /// Snapshot of the effective configuration.
    fn config(&self) -> Thresholds;

    fn state(&self) -> DetectorState;
}

// ---------------------------------------------------------------------------
// FallDetector
// ---------------------------------------------------------------------------

/// The impact-then-stillness fall detector.
pub struct FallDetector {
    cfg: Thresholds,
    phase: Phase,
    impact_at: u64,
    /// `None` until the first fall, so a detector fed timestamps near zero
    /// is not born inside a cooldown.
    last_trigger: Option<u64>,
    window: SampleWindow,
    debug: bool,
}

impl FallDetector {
    pub fn new(cfg: Thresholds) -> Self {
        Self {
            cfg,
            phase: Phase::Idle,
            impact_at: 0,
            last_trigger: None,
            window: SampleWindow::new(),
            debug: false,
        }
    }

    /// Enable per-sample trace logging (used in test mode).
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Number of samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.window.len()
    }

    fn in_cooldown(&self, now: u64) -> bool {
        self.last_trigger
            .is_some_and(|t| now.saturating_sub(t) < self.cfg.cooldown_ms)
    }

    fn observe(&mut self, now: u64) -> Detection {
        let dt = now.saturating_sub(self.impact_at);
        if dt < self.cfg.impact_grace_ms {
            return Detection::Nothing;
        }

        let since = now.saturating_sub(self.cfg.stillness_window_ms);
        let stillness = self.window.analyze(since, self.cfg.stillness_g);

        if self.debug {
            debug!(
                "ANALYZE avg={:.2} still_ms={}ms dt={}ms",
                stillness.avg_g, stillness.still_ms, dt
            );
        }

        // Either a still mean or enough still time confirms.
        if stillness.avg_g <= self.cfg.stillness_g
            || stillness.still_ms >= self.cfg.stillness_min_ms
        {
            self.last_trigger = Some(now);
            self.phase = Phase::Idle;
            if self.debug {
                debug!("FALL DETECTED at {now}");
            }
            self.window.retain_recent(now, RETRIGGER_GUARD_MS);
            return Detection::FallConfirmed;
        }

        if dt > self.cfg.observation_deadline_ms() {
            self.phase = Phase::Idle;
            if self.debug {
                debug!("RESET (no stillness) after {dt}ms");
            }
            return Detection::ObservationExpired;
        }

        Detection::Nothing
    }
}

impl Detector for FallDetector {
    fn on_sample(&mut self, g: f32, now_ms: u64) -> Detection {
        if let Some(latest) = self.window.latest_t() {
            if now_ms < latest {
                debug!("dropping out-of-order sample t={now_ms} (latest {latest})");
                return Detection::Nothing;
            }
        }

        self.window.push(Sample { t: now_ms, g });
        self.window
            .prune_before(now_ms.saturating_sub(self.cfg.retention_ms()));

        if self.in_cooldown(now_ms) {
            return Detection::Nothing;
        }

        match self.phase {
            Phase::Idle => {
                if g >= self.cfg.impact_g {
                    self.phase = Phase::AfterImpact;
                    self.impact_at = now_ms;
                    if self.debug {
                        debug!("IMPACT g={g:.2}");
                    }
                    return Detection::ImpactDetected;
                }
                Detection::Nothing
            }
            Phase::AfterImpact => self.observe(now_ms),
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.impact_at = 0;
        self.last_trigger = None;
        self.window.clear();
    }

    fn set_thresholds(&mut self, patch: &ThresholdsPatch) {
        self.cfg.apply(patch);
    }

    fn config(&self) -> Thresholds {
        self.cfg
    }

    fn state(&self) -> DetectorState {
        DetectorState {
            phase: self.phase,
            last_trigger: self.last_trigger.unwrap_or(0),
            impact_at: self.impact_at,
        }
    }
}
