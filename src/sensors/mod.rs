//! Accelerometer readings and host-side sensor sources.
//!
//! A [`Reading`] is one raw tri-axial sample in m/s², optionally carrying
//! its own capture timestamp.  The engine reduces it to a magnitude in g
//! before handing it to the detector.

pub mod replay;

use serde::{Deserialize, Serialize};

use crate::sensitivity::STANDARD_GRAVITY;

/// Raw accelerometer reading (m/s²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Capture time (ms).  The engine stamps readings that lack one.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

impl Reading {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms: None,
        }
    }

    /// The same reading stamped with a capture time.
    #[must_use]
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// A reading along the z axis with the given magnitude in g.
    pub fn from_g(g: f32) -> Self {
        Self::new(0.0, 0.0, g * STANDARD_GRAVITY)
    }

    /// Euclidean magnitude in m/s².
    pub fn magnitude_ms2(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean magnitude in g.
    pub fn magnitude_g(&self) -> f32 {
        self.magnitude_ms2() / STANDARD_GRAVITY
    }
}
