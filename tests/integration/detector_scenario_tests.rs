//! The reference fall, step by step, against the bare detector.

use fallwatch::config::{Thresholds, ThresholdsPatch};
use fallwatch::detector::{Detection, Detector, FallDetector, Phase};

use crate::mock_sensor::reference_fall;

#[test]
fn reference_fall_step_by_step() {
    let mut d = FallDetector::new(Thresholds::default());

    // Baseline.
    assert_eq!(d.on_sample(1.0, 0), Detection::Nothing);
    assert_eq!(d.state().phase, Phase::Idle);

    // Impact.
    assert_eq!(d.on_sample(9.0, 100), Detection::ImpactDetected);
    assert_eq!(d.state().phase, Phase::AfterImpact);
    assert_eq!(d.state().impact_at, 100);

    // Jiggling through the grace period and just past it.
    for t in (200..=1300).step_by(100) {
        assert_eq!(d.on_sample(3.0, t), Detection::Nothing, "t={t}");
    }

    // Stillness: 700 ms of adjacent still pairs is reached at t=2100.
    for t in (1400..=2000).step_by(100) {
        assert_eq!(d.on_sample(1.0, t), Detection::Nothing, "t={t}");
    }
    assert_eq!(d.on_sample(1.0, 2100), Detection::FallConfirmed);
    assert_eq!(d.state().phase, Phase::Idle);
    assert_eq!(d.state().last_trigger, 2100);

    // Still samples and a fresh impact inside the cooldown are swallowed.
    assert_eq!(d.on_sample(1.0, 2200), Detection::Nothing);
    assert_eq!(d.on_sample(9.0, 2300), Detection::Nothing);
    assert_eq!(d.state().phase, Phase::Idle);
    assert_eq!(d.state().impact_at, 100);

    // After the cooldown an impact registers again.
    assert_eq!(d.on_sample(9.0, 12_300), Detection::ImpactDetected);
    assert_eq!(d.state().phase, Phase::AfterImpact);
    assert_eq!(d.state().impact_at, 12_300);
}

#[test]
fn reference_fall_fires_exactly_once() {
    let mut d = FallDetector::new(Thresholds::default());
    let falls: Vec<u64> = reference_fall()
        .into_iter()
        .filter(|&(t, g)| d.on_sample(g, t) == Detection::FallConfirmed)
        .map(|(t, _)| t)
        .collect();
    assert_eq!(falls, vec![2100]);
}

#[test]
fn cooldown_boundary_is_inclusive() {
    let mut d = FallDetector::new(Thresholds::default());
    for (t, g) in reference_fall().into_iter().take_while(|&(t, _)| t <= 2100) {
        d.on_sample(g, t);
    }
    assert_eq!(d.state().last_trigger, 2100);
    assert_eq!(d.on_sample(9.0, 12_099), Detection::Nothing);
    assert_eq!(d.on_sample(9.0, 12_100), Detection::ImpactDetected);
}

#[test]
fn mean_alone_can_confirm() {
    // A single still sample past the grace period whose window mean is
    // below stillness_g confirms, even with no still duration at all.
    let mut d = FallDetector::new(Thresholds::default());
    d.on_sample(9.0, 0);
    // Nothing buffered between the impact and t=1300 except this one.
    assert_eq!(d.on_sample(1.0, 1300), Detection::FallConfirmed);
}

#[test]
fn no_stillness_times_out() {
    let mut d = FallDetector::new(Thresholds::default());
    d.on_sample(9.0, 0);
    let mut expired_at = None;
    for t in (100..=6000).step_by(100) {
        match d.on_sample(2.0, t) {
            Detection::ObservationExpired => {
                expired_at = Some(t);
                break;
            }
            Detection::FallConfirmed => panic!("unexpected fall at {t}"),
            _ => {}
        }
    }
    // Expires at the first sample strictly past grace + max_observe.
    assert_eq!(expired_at, Some(5300));
    assert_eq!(d.state().phase, Phase::Idle);
    assert_eq!(d.state().last_trigger, 0);
}

#[test]
fn patched_impact_threshold_applies_to_next_sample() {
    let mut d = FallDetector::new(Thresholds::default());
    assert_eq!(d.on_sample(5.0, 0), Detection::Nothing);
    d.set_thresholds(&ThresholdsPatch {
        impact_g: Some(4.0),
        ..ThresholdsPatch::default()
    });
    assert_eq!(d.config().impact_g, 4.0);
    assert_eq!(d.on_sample(5.0, 50), Detection::ImpactDetected);
}

#[test]
fn reset_lifts_cooldown() {
    let mut d = FallDetector::new(Thresholds::default());
    for (t, g) in reference_fall().into_iter().take_while(|&(t, _)| t <= 2100) {
        d.on_sample(g, t);
    }
    assert_eq!(d.on_sample(9.0, 2300), Detection::Nothing);
    d.reset();
    assert_eq!(d.on_sample(9.0, 2400), Detection::ImpactDetected);
}

#[test]
fn late_sample_is_ignored() {
    let mut d = FallDetector::new(Thresholds::default());
    d.on_sample(1.0, 500);
    assert_eq!(d.on_sample(9.0, 400), Detection::Nothing);
    assert_eq!(d.state().phase, Phase::Idle);
    assert_eq!(d.buffered(), 1);
    // Equal timestamps are accepted.
    assert_eq!(d.on_sample(9.0, 500), Detection::ImpactDetected);
}
