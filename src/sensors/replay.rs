//! Replay sensor: plays a recorded trace through the engine.
//!
//! Used by the host binary and the integration tests in place of a live
//! accelerometer.  Readings are pushed from a dedicated thread, exactly as
//! a platform sensor callback would; a full queue is retried rather than
//! dropped so a trace is always delivered in full.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::Reading;
use crate::app::ports::SensorSource;
use crate::config::MonitorSettings;
use crate::engine::{PushError, ReadingFeed};
use crate::error::SensorError;

/// Back-off while the engine queue is full.
const FULL_QUEUE_BACKOFF: Duration = Duration::from_millis(1);

/// A recorded session: the settings it was captured with and its readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayTrace {
    #[serde(default)]
    pub settings: MonitorSettings,
    #[serde(default)]
    pub pacing: Pacing,
    pub readings: Vec<Reading>,
}

/// How fast the trace is played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// As fast as the engine drains the queue.
    #[default]
    Burst,
    /// One reading per requested `rate_ms`.
    Realtime,
}

struct ProgressShared {
    total: usize,
    delivered: AtomicUsize,
    finished: AtomicBool,
    done: Signal<CriticalSectionRawMutex, ()>,
}

/// Observer for a replay in progress.  Obtain it before handing the sensor
/// to the engine.
#[derive(Clone)]
pub struct ReplayProgress {
    shared: Arc<ProgressShared>,
}

impl ReplayProgress {
    pub fn total(&self) -> usize {
        self.shared.total
    }

    /// Readings accepted by the engine so far.
    pub fn delivered(&self) -> usize {
        self.shared.delivered.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    /// Block until the replay thread has pushed its last reading (or was
    /// stopped).  Returns the number of readings delivered.
    ///
    /// Supports a single waiter.
    pub fn wait_finished(&self) -> usize {
        if !self.is_finished() {
            futures_lite::future::block_on(self.shared.done.wait());
        }
        self.delivered()
    }
}

/// [`SensorSource`] backed by a recorded list of readings.
pub struct ReplaySensor {
    readings: Arc<[Reading]>,
    pacing: Pacing,
    stop: Arc<AtomicBool>,
    progress: Arc<ProgressShared>,
    thread: Option<JoinHandle<()>>,
}

impl ReplaySensor {
    pub fn new(readings: Vec<Reading>, pacing: Pacing) -> Self {
        let total = readings.len();
        Self {
            readings: readings.into(),
            pacing,
            stop: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(ProgressShared {
                total,
                delivered: AtomicUsize::new(0),
                finished: AtomicBool::new(false),
                done: Signal::new(),
            }),
            thread: None,
        }
    }

    pub fn from_trace(trace: ReplayTrace) -> Self {
        Self::new(trace.readings, trace.pacing)
    }

    pub fn progress(&self) -> ReplayProgress {
        ReplayProgress {
            shared: Arc::clone(&self.progress),
        }
    }
}

impl SensorSource for ReplaySensor {
    fn subscribe(&mut self, rate_ms: u32, feed: ReadingFeed) -> Result<(), SensorError> {
        self.unsubscribe();
        self.stop.store(false, Ordering::Release);
        self.progress.delivered.store(0, Ordering::Release);
        self.progress.finished.store(false, Ordering::Release);
        self.progress.done.reset();

        let readings = Arc::clone(&self.readings);
        let stop = Arc::clone(&self.stop);
        let progress = Arc::clone(&self.progress);
        let pacing = self.pacing;
        let period = Duration::from_millis(u64::from(rate_ms));

        info!(
            "replay: {} readings, pacing={:?}, rate_ms={}",
            readings.len(),
            pacing,
            rate_ms
        );

        let handle = std::thread::Builder::new()
            .name("fallwatch-replay".into())
            .spawn(move || {
                play(&readings, &feed, &stop, &progress, pacing, period);
                progress.finished.store(true, Ordering::Release);
                progress.done.signal(());
            })
            .map_err(|e| {
                warn!("replay thread spawn failed: {e}");
                SensorError::SubscribeFailed
            })?;

        self.thread = Some(handle);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("replay thread panicked");
            }
        }
    }
}

impl Drop for ReplaySensor {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn play(
    readings: &[Reading],
    feed: &ReadingFeed,
    stop: &AtomicBool,
    progress: &ProgressShared,
    pacing: Pacing,
    period: Duration,
) {
    for &reading in readings {
        let mut pending = reading;
        loop {
            if stop.load(Ordering::Acquire) {
                return;
            }
            match feed.try_push(pending) {
                Ok(()) => {
                    progress.delivered.fetch_add(1, Ordering::AcqRel);
                    break;
                }
                Err(PushError::Full(r)) => {
                    pending = r;
                    std::thread::sleep(FULL_QUEUE_BACKOFF);
                }
                Err(PushError::Closed) => return,
            }
        }
        if pacing == Pacing::Realtime {
            std::thread::sleep(period);
        }
    }
}
