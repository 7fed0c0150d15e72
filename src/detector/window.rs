//! Rolling sample buffer and stillness analysis.
//!
//! Samples are held in a fixed-capacity `heapless::Deque` in timestamp
//! order.  The detector prunes it on every sample, so under normal sensor
//! rates it stays far below capacity.  If a burst ever fills it, the oldest
//! sample is evicted; the analysis window only ever looks at the newest
//! samples, so eviction never touches data the analysis needs unless the
//! sensor runs well above 400 Hz.

use heapless::Deque;
use log::warn;

/// Hard upper bound on buffered samples.
pub const MAX_BUFFERED_SAMPLES: usize = 512;

/// One magnitude reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Timestamp (ms).
    pub t: u64,
    /// Magnitude (g).
    pub g: f32,
}

/// Result of a stillness analysis over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stillness {
    /// Mean magnitude of the samples in the window; `+inf` if none.
    pub avg_g: f32,
    /// Summed duration of adjacent still pairs inside the window.
    pub still_ms: u64,
    /// Number of samples that contributed to the mean.
    pub samples: usize,
}

/// Time-ordered sample buffer.
pub struct SampleWindow {
    buf: Deque<Sample, MAX_BUFFERED_SAMPLES>,
    /// Set while the buffer is saturated so the overflow is logged once.
    overflowing: bool,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            buf: Deque::new(),
            overflowing: false,
        }
    }

    /// Append a sample, evicting the oldest one if the buffer is full.
    pub fn push(&mut self, sample: Sample) {
        if self.buf.is_full() {
            if !self.overflowing {
                warn!(
                    "sample buffer saturated at {} entries; evicting oldest",
                    MAX_BUFFERED_SAMPLES
                );
                self.overflowing = true;
            }
            self.buf.pop_front();
        } else {
            self.overflowing = false;
        }
        // Cannot fail: a slot was freed above if the buffer was full.
        let _ = self.buf.push_back(sample);
    }

    /// Timestamp of the newest sample.
    pub fn latest_t(&self) -> Option<u64> {
        self.buf.back().map(|s| s.t)
    }

    /// Drop every sample older than `keep_since`.
    pub fn prune_before(&mut self, keep_since: u64) {
        while self.buf.front().is_some_and(|s| s.t < keep_since) {
            self.buf.pop_front();
        }
    }

    /// Keep only samples strictly younger than `span_ms` relative to `now`.
    pub fn retain_recent(&mut self, now: u64, span_ms: u64) {
        while self
            .buf
            .front()
            .is_some_and(|s| now.saturating_sub(s.t) >= span_ms)
        {
            self.buf.pop_front();
        }
    }

    /// Analyse the samples with `t >= since`.
    ///
    /// Walks adjacent pairs `(prev, cur)`.  Every `cur` inside the window
    /// contributes to the mean; a pair contributes its duration to
    /// `still_ms` when both ends are inside the window and both are at or
    /// below `stillness_g`.  The first buffered sample is never a `cur`.
    pub fn analyze(&self, since: u64, stillness_g: f32) -> Stillness {
        let mut sum = 0.0_f32;
        let mut samples = 0_usize;
        let mut still_ms = 0_u64;

        for (prev, cur) in self.buf.iter().zip(self.buf.iter().skip(1)) {
            if cur.t < since {
                continue;
            }
            sum += cur.g;
            samples += 1;
            if prev.t >= since && prev.g <= stillness_g && cur.g <= stillness_g {
                still_ms += cur.t - prev.t;
            }
        }

        let avg_g = if samples > 0 {
            sum / samples as f32
        } else {
            f32::INFINITY
        };

        Stillness {
            avg_g,
            still_ms,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.overflowing = false;
    }

    /// Oldest-first iterator over the buffered samples.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.buf.iter()
    }
}
