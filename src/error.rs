//! Unified error types for the detection engine.
//!
//! The detector itself cannot fail; errors only arise at the edges where the
//! engine acquires resources (sensor subscription, worker thread) or where a
//! configuration is checked.  All variants are `Copy` so they can be logged
//! and returned without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor source could not deliver readings.
    Sensor(SensorError),
    /// The engine could not start or tear down its worker.
    Engine(EngineError),
    /// A configuration value is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Engine(e) => write!(f, "engine: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No accelerometer is present on this device.
    Unavailable,
    /// The platform refused the subscription request.
    SubscribeFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "accelerometer unavailable"),
            Self::SubscribeFailed => write!(f, "subscription failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The OS refused to create the worker thread.
    WorkerSpawnFailed,
    /// The worker thread exited unexpectedly (detector panic).
    WorkerPanicked,
    /// The operation requires a running engine.
    NotRunning,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerSpawnFailed => write!(f, "worker spawn failed"),
            Self::WorkerPanicked => write!(f, "worker panicked"),
            Self::NotRunning => write!(f, "engine not running"),
        }
    }
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
