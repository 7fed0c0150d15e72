//! Monitor service: the long-lived owner of the engine.
//!
//! [`MonitorService`] interprets [`MonitorCommand`]s from the outside world,
//! starts and stops the [`Engine`] with the production detector, and routes
//! confirmed falls to the [`AlertPort`].
//!
//! ```text
//!  MonitorCommand ──▶ ┌──────────────────┐
//!                     │  MonitorService   │──▶ AlertPort
//!  SensorSource ────▶ │  Engine·Detector  │
//!                     └──────────────────┘
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::app::events::EngineEvent;
use crate::config::{MonitorSettings, Thresholds};
use crate::detector::FallDetector;
use crate::engine::{Engine, Subscription};
use crate::error::Result;
use crate::sensitivity::{MAX_SENSITIVITY, MIN_SENSITIVITY};

use super::commands::MonitorCommand;
use super::ports::{AlertPort, Clock, SensorSource};

/// The detector every production session runs: default thresholds with
/// the mapped impact level, trace logging in test mode.
pub fn default_detector(impact_g: f32, test_mode: bool) -> FallDetector {
    FallDetector::new(Thresholds::with_impact_g(impact_g)).with_debug(test_mode)
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService<S, A, C = MonotonicClock>
where
    S: SensorSource,
    A: AlertPort + 'static,
    C: Clock + 'static,
{
    engine: Engine<S, C>,
    alert: Arc<A>,
    alert_route: Option<Subscription>,
    settings: MonitorSettings,
}

impl<S, A, C> MonitorService<S, A, C>
where
    S: SensorSource,
    A: AlertPort + 'static,
    C: Clock + 'static,
{
    /// Wrap an engine and route its fall events to `alert`.
    pub fn new(engine: Engine<S, C>, alert: Arc<A>) -> Self {
        let port = Arc::clone(&alert);
        let route = engine.subscribe(move |event: &EngineEvent| {
            if let EngineEvent::Fall { ts } = *event {
                port.raise_fall_alert(ts);
            }
        });
        Self {
            engine,
            alert,
            alert_route: Some(route),
            settings: MonitorSettings::default(),
        }
    }

    // ── Commands ──────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: MonitorCommand) -> Result<()> {
        match cmd {
            MonitorCommand::Start(settings) => self.start(settings),
            MonitorCommand::Stop => {
                self.engine.stop();
                Ok(())
            }
            MonitorCommand::Restart(settings) => {
                self.engine.stop();
                self.start(settings)
            }
            MonitorCommand::UpdateThresholds(patch) => {
                info!("CMD | update thresholds {:?}", patch);
                self.engine.update_thresholds(patch)
            }
            MonitorCommand::ResetDetector => {
                info!("CMD | reset detector");
                self.engine.reset_detector()
            }
        }
    }

    fn start(&mut self, settings: MonitorSettings) -> Result<()> {
        if self.engine.is_running() {
            info!("CMD | start ignored: already monitoring");
            return Ok(());
        }
        if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&settings.sensitivity) {
            warn!(
                "sensitivity {} outside {MIN_SENSITIVITY}..={MAX_SENSITIVITY}, clamping",
                settings.sensitivity
            );
        }
        let test_mode = settings.test_mode;
        self.engine.start(settings.sensitivity, test_mode, |g| {
            default_detector(g, test_mode)
        })?;
        self.settings = settings;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_monitoring(&self) -> bool {
        self.engine.is_running()
    }

    /// Settings of the last successful start.
    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    pub fn engine(&self) -> &Engine<S, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<S, C> {
        &mut self.engine
    }

    /// Stop routing falls to the alert port.  Returns `false` if already
    /// detached.
    pub fn detach_alerts(&mut self) -> bool {
        self.alert_route.take().is_some_and(Subscription::unsubscribe)
    }
}
