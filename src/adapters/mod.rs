//! Adapters: concrete implementations of the port traits for hosts.
//!
//! | Adapter    | Implements     | Connects to        |
//! |------------|----------------|--------------------|
//! | `log_sink` | EngineListener | `log` facade       |
//! |            | AlertPort      | `log` facade       |
//! | `time`     | Clock          | `std::time`        |
//!
//! The replay sensor lives in [`crate::sensors::replay`].

pub mod log_sink;
pub mod time;
