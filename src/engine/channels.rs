//! Engine inter-thread queue.
//!
//! Sensor callbacks may arrive on any thread.  They are serialised onto the
//! engine worker through one bounded `embassy-sync` channel, so the detector
//! only ever sees a single logical stream.  Control messages from the
//! engine (threshold patches, resets, flush barriers, shutdown) travel on
//! the same queue and are therefore ordered with the readings.
//!
//! ```text
//! ┌──────────────┐  Reading   ┌───────────────┐
//! │ Sensor thread│──────────▶│               │
//! └──────────────┘            │  WorkerMsg    │   ┌──────────────┐
//! ┌──────────────┐  Patch /   │  channel      │──▶│ Engine worker│
//! │ Engine owner │  Reset /   │ (bounded, 64) │   │  (detector)  │
//! └──────────────┘  Barrier ─▶│               │   └──────────────┘
//!                             └───────────────┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;

use crate::config::ThresholdsPatch;
use crate::sensors::Reading;

/// Queue depth.  At 20 Hz this is over three seconds of readings.
pub const QUEUE_DEPTH: usize = 64;

/// One-shot completion signal used by flush barriers.
pub(crate) type Barrier = Signal<CriticalSectionRawMutex, ()>;

/// Messages consumed by the worker.
pub(crate) enum WorkerMsg {
    Reading(Reading),
    Patch(ThresholdsPatch),
    Reset,
    /// Signalled once every message queued before it has been handled.
    Barrier(Arc<Barrier>),
    Shutdown,
}

/// State shared between feeds, the engine, and the worker.
pub(crate) struct FeedShared {
    pub(crate) channel: Channel<CriticalSectionRawMutex, WorkerMsg, QUEUE_DEPTH>,
    /// Cleared on stop; closed feeds reject readings.
    open: AtomicBool,
    /// Set on stop; the worker exits at its next receive.
    pub(crate) shutdown: AtomicBool,
    dropped: AtomicU32,
}

/// Why a reading was not queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushError {
    /// The engine has stopped.
    Closed,
    /// The queue is full; the reading is handed back.
    Full(Reading),
}

/// Producer handle given to a [`SensorSource`](crate::app::ports::SensorSource).
///
/// Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct ReadingFeed {
    pub(crate) shared: Arc<FeedShared>,
}

impl ReadingFeed {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(FeedShared {
                channel: Channel::new(),
                open: AtomicBool::new(true),
                shutdown: AtomicBool::new(false),
                dropped: AtomicU32::new(0),
            }),
        }
    }

    /// Queue a reading, dropping it if the queue is full.
    ///
    /// Returns `false` if the reading was not queued.  Drops on a full
    /// queue are counted; there is no back-pressure.
    pub fn push(&self, reading: Reading) -> bool {
        match self.try_push(reading) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(PushError::Closed) => false,
        }
    }

    /// Queue a reading, handing it back if the queue is full.
    pub fn try_push(&self, reading: Reading) -> Result<(), PushError> {
        if !self.is_open() {
            return Err(PushError::Closed);
        }
        self.shared
            .channel
            .try_send(WorkerMsg::Reading(reading))
            .map_err(|TrySendError::Full(msg)| match msg {
                WorkerMsg::Reading(r) => PushError::Full(r),
                _ => PushError::Closed,
            })
    }

    /// Whether the engine still accepts readings from this feed.
    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }

    /// Readings dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn close(&self) {
        self.shared.open.store(false, Ordering::Release);
    }

    /// Ask the worker to exit.  Never blocks: if the queue is full the
    /// worker still sees the flag after its next receive.
    pub(crate) fn request_shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        let _ = self.shared.channel.try_send(WorkerMsg::Shutdown);
    }

    /// Enqueue a control message, waiting for space.
    pub(crate) fn send_control(&self, msg: WorkerMsg) {
        futures_lite::future::block_on(self.shared.channel.send(msg));
    }
}
