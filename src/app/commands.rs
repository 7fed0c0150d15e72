//! Inbound commands to the monitor service.
//!
//! These represent actions requested by the outside world (settings screen,
//! test panel, boot receiver) that the
//! [`MonitorService`](super::service::MonitorService) interprets.

use crate::config::{MonitorSettings, ThresholdsPatch};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorCommand {
    /// Begin monitoring.  Ignored if already monitoring.
    Start(MonitorSettings),

    /// Stop monitoring.  Ignored if not monitoring.
    Stop,

    /// Stop (if running) and start again with new settings.
    Restart(MonitorSettings),

    /// Tune the live detector (testing / calibration only).
    UpdateThresholds(ThresholdsPatch),

    /// Clear the live detector's state and cooldown.
    ResetDetector,
}
