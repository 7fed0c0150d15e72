//! Fall engine: sensor subscription, worker lifecycle, event fan-out.
//!
//! ```text
//!   SensorSource ──push──▶ ReadingFeed ──▶ worker thread ──▶ ListenerSet
//!                                           (owns Detector)
//! ```
//!
//! [`Engine::start`] builds a detector from the sensitivity, subscribes the
//! sensor and spawns the worker.  [`Engine::stop`] tears all of it down in
//! reverse.  Listeners are registered on the engine itself and survive
//! stop/start cycles.
//!
//! Control calls ([`Engine::update_thresholds`], [`Engine::reset_detector`])
//! are queued behind readings already in flight and take effect when the
//! worker reaches them.  [`Engine::flush`] waits for that point.

pub mod channels;
pub mod listeners;
mod worker;

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error, info, warn};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::{Clock, EngineListener, SensorSource};
use crate::config::{MonitorSettings, Thresholds, ThresholdsPatch};
use crate::detector::{Detector, DetectorState};
use crate::error::{EngineError, Result};
use crate::sensitivity;

pub use channels::{PushError, QUEUE_DEPTH, ReadingFeed};
use channels::{Barrier, WorkerMsg};
pub use listeners::{ListenerId, ListenerSet, Subscription};
use worker::{SessionCell, Worker};

/// Point-in-time view of a running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStatus {
    pub settings: MonitorSettings,
    pub detector: DetectorState,
    /// Readings the worker has fed to the detector.
    pub samples_processed: u64,
    /// Readings lost to a full queue.
    pub readings_dropped: u32,
}

struct Session {
    feed: ReadingFeed,
    worker: JoinHandle<()>,
    cell: Arc<SessionCell>,
    settings: MonitorSettings,
}

impl Session {
    fn ensure_alive(&self) -> Result<()> {
        if self.worker.is_finished() {
            error!("engine worker is gone");
            return Err(EngineError::WorkerPanicked.into());
        }
        Ok(())
    }
}

/// Owns the sensor and at most one running detection session.
pub struct Engine<S: SensorSource, C: Clock + 'static = MonotonicClock> {
    sensor: S,
    clock: Arc<C>,
    listeners: Arc<ListenerSet>,
    session: Option<Session>,
}

impl<S: SensorSource> Engine<S> {
    /// Engine stamping untimed readings with a monotonic clock.
    pub fn with_sensor(sensor: S) -> Self {
        Self::new(sensor, MonotonicClock::new())
    }
}

impl<S: SensorSource, C: Clock + 'static> Engine<S, C> {
    pub fn new(sensor: S, clock: C) -> Self {
        Self {
            sensor,
            clock: Arc::new(clock),
            listeners: Arc::new(ListenerSet::new()),
            session: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start monitoring.
    ///
    /// `factory` receives the impact threshold (g) derived from
    /// `sensitivity` and returns the detector to run.  Calling `start`
    /// while running is a no-op.  On failure nothing is left subscribed
    /// and the engine stays stopped.
    pub fn start<D, F>(&mut self, sensitivity: i32, test_mode: bool, factory: F) -> Result<()>
    where
        D: Detector + 'static,
        F: FnOnce(f32) -> D,
    {
        if self.session.is_some() {
            warn!("start() ignored: engine already running");
            return Ok(());
        }

        let impact_g = sensitivity::to_impact_g(sensitivity);
        let detector = factory(impact_g);
        let config = detector.config();
        if let Err(e) = config.validate() {
            warn!("detector config looks wrong ({e}); continuing");
        }

        let settings = MonitorSettings {
            sensitivity,
            test_mode,
        };
        info!(
            "engine start: sensitivity={sensitivity} impact_g={impact_g:.2} test_mode={test_mode} rate_ms={}",
            config.rate_ms
        );

        let feed = ReadingFeed::new();
        if let Err(e) = self.sensor.subscribe(config.rate_ms, feed.clone()) {
            error!("sensor subscribe failed: {e}");
            feed.close();
            return Err(e.into());
        }

        let cell = Arc::new(SessionCell::new(config, detector.state()));
        let spawned = worker::spawn(Worker {
            detector,
            feed: feed.clone(),
            listeners: Arc::clone(&self.listeners),
            session: Arc::clone(&cell),
            clock: Arc::clone(&self.clock),
            test_mode,
        });
        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.sensor.unsubscribe();
                feed.close();
                return Err(e);
            }
        };

        self.session = Some(Session {
            feed,
            worker,
            cell,
            settings,
        });
        Ok(())
    }

    /// Stop monitoring.  Idempotent.
    ///
    /// Readings still queued when this is called are discarded.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("stop() ignored: engine not running");
            return;
        };

        info!(
            "engine stop: sensitivity={} test_mode={}",
            session.settings.sensitivity, session.settings.test_mode
        );
        self.sensor.unsubscribe();
        session.feed.close();
        session.feed.request_shutdown();
        if session.worker.join().is_err() {
            error!("engine worker panicked");
        }

        let dropped = session.feed.dropped();
        if dropped > 0 {
            warn!("{dropped} readings dropped on a full queue this session");
        }
    }

    // ── Listeners ────────────────────────────────────────────────

    /// Register a listener for every subsequent event.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: EngineListener + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already shared listener.
    pub fn subscribe_shared(&self, listener: Arc<dyn EngineListener>) -> Subscription {
        let id = self.listeners.add(listener);
        Subscription::new(id, &self.listeners)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Introspection ────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Test mode of the running session; `false` when stopped.
    pub fn test_mode(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.settings.test_mode)
    }

    pub fn settings(&self) -> Option<MonitorSettings> {
        self.session.as_ref().map(|s| s.settings)
    }

    /// Effective detector thresholds, `None` when stopped.
    ///
    /// Reflects patches the worker has already applied; call
    /// [`flush`](Self::flush) first to observe a just-queued update.
    pub fn config(&self) -> Option<Thresholds> {
        self.session.as_ref().map(|s| s.cell.snapshot().config)
    }

    pub fn status(&self) -> Option<EngineStatus> {
        self.session.as_ref().map(|s| {
            let snap = s.cell.snapshot();
            EngineStatus {
                settings: s.settings,
                detector: snap.detector,
                samples_processed: snap.samples_processed,
                readings_dropped: s.feed.dropped(),
            }
        })
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Control ──────────────────────────────────────────────────

    /// Queue a partial threshold update for the live detector.
    pub fn update_thresholds(&self, patch: ThresholdsPatch) -> Result<()> {
        let session = self.live_session()?;
        if patch.is_empty() {
            debug!("empty thresholds patch ignored");
            return Ok(());
        }
        session.feed.send_control(WorkerMsg::Patch(patch));
        Ok(())
    }

    /// Queue a detector reset (phase, buffer and cooldown).
    pub fn reset_detector(&self) -> Result<()> {
        let session = self.live_session()?;
        session.feed.send_control(WorkerMsg::Reset);
        Ok(())
    }

    /// Block until everything queued before this call has been processed
    /// and its events delivered.
    pub fn flush(&self) -> Result<()> {
        let session = self.live_session()?;
        let barrier = Arc::new(Barrier::new());
        session
            .feed
            .send_control(WorkerMsg::Barrier(Arc::clone(&barrier)));
        futures_lite::future::block_on(barrier.wait());
        Ok(())
    }

    fn live_session(&self) -> Result<&Session> {
        let session = self.session.as_ref().ok_or(EngineError::NotRunning)?;
        session.ensure_alive()?;
        Ok(session)
    }
}

impl<S: SensorSource, C: Clock + 'static> Drop for Engine<S, C> {
    fn drop(&mut self) {
        self.stop();
    }
}
