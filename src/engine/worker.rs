//! Engine worker thread.
//!
//! The worker owns the detector for the lifetime of one monitoring session.
//! It drains the [`WorkerMsg`] queue, turns each reading into a magnitude,
//! feeds the detector, and fans the resulting events out to listeners.
//! Nothing else ever touches the detector, so it needs no locking.

use core::cell::RefCell;
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, error, info};

use super::channels::{ReadingFeed, WorkerMsg};
use super::listeners::ListenerSet;
use crate::app::events::EngineEvent;
use crate::app::ports::Clock;
use crate::config::Thresholds;
use crate::detector::{Detection, Detector, DetectorState};
use crate::error::{EngineError, Result};
use crate::sensors::Reading;

const WORKER_STACK_BYTES: usize = 128 * 1024;

/// Samples at or above this are traced in test mode.
const TEST_MODE_TRACE_G: f32 = 2.0;

// ---------------------------------------------------------------------------
// Shared session snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionSnapshot {
    pub(crate) config: Thresholds,
    pub(crate) detector: DetectorState,
    pub(crate) samples_processed: u64,
}

/// Written by the worker, read by the engine owner.
pub(crate) struct SessionCell {
    inner: Mutex<CriticalSectionRawMutex, RefCell<SessionSnapshot>>,
}

impl SessionCell {
    pub(crate) fn new(config: Thresholds, detector: DetectorState) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SessionSnapshot {
                config,
                detector,
                samples_processed: 0,
            })),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock(|cell| *cell.borrow())
    }

    fn record_sample(&self, detector: DetectorState) {
        self.inner.lock(|cell| {
            let mut snap = cell.borrow_mut();
            snap.detector = detector;
            snap.samples_processed += 1;
        });
    }

    fn record_state(&self, config: Thresholds, detector: DetectorState) {
        self.inner.lock(|cell| {
            let mut snap = cell.borrow_mut();
            snap.config = config;
            snap.detector = detector;
        });
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

pub(crate) struct Worker<D, C> {
    pub(crate) detector: D,
    pub(crate) feed: ReadingFeed,
    pub(crate) listeners: Arc<ListenerSet>,
    pub(crate) session: Arc<SessionCell>,
    pub(crate) clock: Arc<C>,
    pub(crate) test_mode: bool,
}

impl<D: Detector, C: Clock> Worker<D, C> {
    fn run(mut self) {
        let mut impact_g = self.detector.config().impact_g;
        debug!("engine worker running, impact_g={impact_g:.2}");

        loop {
            let msg = futures_lite::future::block_on(self.feed.shared.channel.receive());
            if self
                .feed
                .shared
                .shutdown
                .load(core::sync::atomic::Ordering::Acquire)
            {
                break;
            }
            match msg {
                WorkerMsg::Reading(reading) => self.process(reading, impact_g),
                WorkerMsg::Patch(patch) => {
                    self.detector.set_thresholds(&patch);
                    let cfg = self.detector.config();
                    impact_g = cfg.impact_g;
                    self.session.record_state(cfg, self.detector.state());
                    info!("thresholds updated: {:?}", cfg);
                }
                WorkerMsg::Reset => {
                    self.detector.reset();
                    self.session
                        .record_state(self.detector.config(), self.detector.state());
                    info!("detector reset");
                }
                WorkerMsg::Barrier(barrier) => barrier.signal(()),
                WorkerMsg::Shutdown => break,
            }
        }

        debug!("engine worker exiting");
    }

    fn process(&mut self, reading: Reading, impact_g: f32) {
        let g = reading.magnitude_g();
        let ts = reading.timestamp_ms.unwrap_or_else(|| self.clock.now_ms());

        let detection = self.detector.on_sample(g, ts);
        self.session.record_sample(self.detector.state());

        if detection == Detection::FallConfirmed {
            info!("fall confirmed at ts={ts} test_mode={}", self.test_mode);
            if self.test_mode {
                debug!("test mode: fall event not forwarded");
            } else {
                self.listeners.emit(&EngineEvent::Fall { ts });
            }
        }

        if self.test_mode && g >= TEST_MODE_TRACE_G {
            debug!("sample g={g:.2} ts={ts}");
        }

        self.listeners.emit(&EngineEvent::Sample { g, ts });

        if g >= impact_g {
            info!("impact threshold crossed: g={g:.2} >= impact_g={impact_g:.2} ts={ts}");
            self.listeners
                .emit(&EngineEvent::Impact { g, ts, impact_g });
        }
    }
}

/// Spawn the worker on its own named thread.
pub(crate) fn spawn<D, C>(worker: Worker<D, C>) -> Result<JoinHandle<()>>
where
    D: Detector + 'static,
    C: Clock + 'static,
{
    std::thread::Builder::new()
        .name("fallwatch-engine".into())
        .stack_size(WORKER_STACK_BYTES)
        .spawn(move || worker.run())
        .map_err(|e| {
            error!("engine worker spawn failed: {e}");
            EngineError::WorkerSpawnFailed.into()
        })
}
