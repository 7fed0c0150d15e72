//! Mock adapters for integration tests.
//!
//! `MockSensor` hands its feed to a `SensorHandle` so tests push readings
//! exactly where and when they want; `ManualClock` is set by hand; the
//! recording listener and alert capture everything they receive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use fallwatch::app::events::EngineEvent;
use fallwatch::app::ports::{AlertPort, Clock, EngineListener, SensorSource};
use fallwatch::engine::ReadingFeed;
use fallwatch::error::SensorError;
use fallwatch::sensors::Reading;

// ── Sensor ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCall {
    Subscribe { rate_ms: u32 },
    Unsubscribe,
}

pub struct MockSensor {
    slot: Arc<Mutex<Option<ReadingFeed>>>,
    calls: Arc<Mutex<Vec<SensorCall>>>,
    unavailable: bool,
}

/// Test-side end of a [`MockSensor`].
#[derive(Clone)]
pub struct SensorHandle {
    slot: Arc<Mutex<Option<ReadingFeed>>>,
    calls: Arc<Mutex<Vec<SensorCall>>>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new() -> (Self, SensorHandle) {
        let slot = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let handle = SensorHandle {
            slot: Arc::clone(&slot),
            calls: Arc::clone(&calls),
        };
        (
            Self {
                slot,
                calls,
                unavailable: false,
            },
            handle,
        )
    }

    /// A device without an accelerometer.
    pub fn unavailable() -> (Self, SensorHandle) {
        let (mut sensor, handle) = Self::new();
        sensor.unavailable = true;
        (sensor, handle)
    }
}

impl SensorSource for MockSensor {
    fn subscribe(&mut self, rate_ms: u32, feed: ReadingFeed) -> Result<(), SensorError> {
        self.calls
            .lock()
            .unwrap()
            .push(SensorCall::Subscribe { rate_ms });
        if self.unavailable {
            return Err(SensorError::Unavailable);
        }
        *self.slot.lock().unwrap() = Some(feed);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.calls.lock().unwrap().push(SensorCall::Unsubscribe);
        self.slot.lock().unwrap().take();
    }
}

#[allow(dead_code)]
impl SensorHandle {
    /// Push a reading; `false` if the engine is not subscribed or dropped it.
    pub fn push(&self, reading: Reading) -> bool {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|feed| feed.push(reading))
    }

    /// Push a timestamped reading of magnitude `g`.
    pub fn push_g(&self, g: f32, t: u64) -> bool {
        self.push(Reading::from_g(g).at(t))
    }

    /// The feed from the current subscription, if any.
    pub fn feed(&self) -> Option<ReadingFeed> {
        self.slot.lock().unwrap().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    pub fn calls(&self) -> Vec<SensorCall> {
        self.calls.lock().unwrap().clone()
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

#[allow(dead_code)]
impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Listener / alert ──────────────────────────────────────────

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<EngineEvent>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn falls(&self) -> Vec<u64> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Fall { ts } => Some(*ts),
                _ => None,
            })
            .collect()
    }

    pub fn impacts(&self) -> Vec<(u64, f32)> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Impact { ts, impact_g, .. } => Some((*ts, *impact_g)),
                _ => None,
            })
            .collect()
    }

    pub fn samples(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, EngineEvent::Sample { .. }))
            .count()
    }
}

impl EngineListener for Recorder {
    fn on_event(&self, event: &EngineEvent) {
        self.0.lock().unwrap().push(*event);
    }
}

#[derive(Default)]
pub struct RecordingAlert(Mutex<Vec<u64>>);

#[allow(dead_code)]
impl RecordingAlert {
    pub fn raised(&self) -> Vec<u64> {
        self.0.lock().unwrap().clone()
    }
}

impl AlertPort for RecordingAlert {
    fn raise_fall_alert(&self, at_ms: u64) {
        self.0.lock().unwrap().push(at_ms);
    }
}

// ── Scenario ──────────────────────────────────────────────────

/// The reference fall: baseline, impact at 100, jiggling through the
/// grace period, then stillness from 1400 to 2200, a second impact inside
/// the cooldown at 2300 and one after it at 12300.
#[allow(dead_code)]
pub fn reference_fall() -> Vec<(u64, f32)> {
    let mut s = vec![(0, 1.0), (100, 9.0)];
    s.extend((200..=1300).step_by(100).map(|t| (t, 3.0)));
    s.extend((1400..=2200).step_by(100).map(|t| (t, 1.0)));
    s.push((2300, 9.0));
    s.push((12_300, 9.0));
    s
}
