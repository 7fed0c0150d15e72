//! Fuzz target: `FallDetector::on_sample`
//!
//! Decodes arbitrary bytes into a stream of (gap, magnitude) samples and
//! occasional threshold patches, then asserts that the detector never
//! panics and that its invariants hold:
//! - the buffer never exceeds `MAX_BUFFERED_SAMPLES`
//! - consecutive confirmations are at least `cooldown_ms` apart
//! - a confirmation always leaves the detector IDLE
//!
//! cargo fuzz run fuzz_detector

#![no_main]

use fallwatch::config::{Thresholds, ThresholdsPatch};
use fallwatch::detector::window::MAX_BUFFERED_SAMPLES;
use fallwatch::detector::{Detection, Detector, FallDetector, Phase};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut d = FallDetector::new(Thresholds::default()).with_debug(data.first() == Some(&0));
    let mut t: u64 = 0;
    let mut last_fall: Option<u64> = None;

    for chunk in data.chunks_exact(4) {
        let gap = u64::from(u16::from_le_bytes([chunk[0], chunk[1]]) % 512);
        t = t.saturating_add(gap);

        // Opcode 0xFF in the magnitude byte patches the cooldown instead.
        if chunk[2] == 0xFF {
            d.set_thresholds(&ThresholdsPatch {
                cooldown_ms: Some(u64::from(chunk[3]) * 100),
                ..ThresholdsPatch::default()
            });
            continue;
        }
        let g = f32::from(chunk[2]) / 16.0 + f32::from(chunk[3]) / 4096.0;

        let cooldown = d.config().cooldown_ms;
        if d.on_sample(g, t) == Detection::FallConfirmed {
            if let Some(prev) = last_fall {
                assert!(t - prev >= cooldown, "cooldown violated");
            }
            assert_eq!(d.state().phase, Phase::Idle);
            assert_eq!(d.state().last_trigger, t);
            last_fall = Some(t);
        }
        assert!(d.buffered() <= MAX_BUFFERED_SAMPLES);
    }
});
