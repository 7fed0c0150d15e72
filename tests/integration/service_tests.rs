//! Monitor service tests: command handling and alert routing, with the
//! mock sensor and with a replayed trace.

use std::sync::Arc;

use fallwatch::app::commands::MonitorCommand;
use fallwatch::app::service::MonitorService;
use fallwatch::config::{MonitorSettings, ThresholdsPatch};
use fallwatch::engine::Engine;
use fallwatch::error::{Error, SensorError};
use fallwatch::sensors::Reading;
use fallwatch::sensors::replay::{Pacing, ReplaySensor, ReplayTrace};

use crate::mock_sensor::{
    ManualClock, MockSensor, Recorder, RecordingAlert, SensorHandle, reference_fall,
};

fn start(test_mode: bool) -> MonitorCommand {
    MonitorCommand::Start(MonitorSettings {
        sensitivity: 5,
        test_mode,
    })
}

fn mock_service() -> (
    MonitorService<MockSensor, RecordingAlert, ManualClock>,
    SensorHandle,
    Arc<RecordingAlert>,
) {
    let (sensor, handle) = MockSensor::new();
    let alert = Arc::new(RecordingAlert::default());
    let engine = Engine::new(sensor, ManualClock::default());
    (MonitorService::new(engine, Arc::clone(&alert)), handle, alert)
}

/// The reference fall scaled for sensitivity 5 (impact_g ≈ 6.1).
fn feed_reference(handle: &SensorHandle) {
    for (t, g) in reference_fall() {
        assert!(handle.push_g(g, t));
    }
}

#[test]
fn confirmed_fall_raises_alert() {
    let (mut svc, handle, alert) = mock_service();
    svc.handle_command(start(false)).unwrap();
    feed_reference(&handle);
    svc.engine().flush().unwrap();
    assert_eq!(alert.raised(), vec![2100]);
}

#[test]
fn test_mode_never_alerts() {
    let (mut svc, handle, alert) = mock_service();
    svc.handle_command(start(true)).unwrap();
    feed_reference(&handle);
    svc.engine().flush().unwrap();
    assert!(alert.raised().is_empty());
    assert_eq!(svc.engine().status().unwrap().detector.last_trigger, 2100);
}

#[test]
fn start_while_monitoring_keeps_first_settings() {
    let (mut svc, handle, _) = mock_service();
    svc.handle_command(start(false)).unwrap();
    svc.handle_command(start(true)).unwrap();
    assert!(!svc.settings().test_mode);
    assert_eq!(handle.calls().len(), 1);
}

#[test]
fn restart_switches_to_test_mode() {
    let (mut svc, handle, alert) = mock_service();
    svc.handle_command(start(false)).unwrap();
    svc.handle_command(MonitorCommand::Restart(MonitorSettings {
        sensitivity: 5,
        test_mode: true,
    }))
    .unwrap();
    assert!(svc.settings().test_mode);
    feed_reference(&handle);
    svc.engine().flush().unwrap();
    assert!(alert.raised().is_empty());
}

#[test]
fn unavailable_sensor_fails_start() {
    let (sensor, _) = MockSensor::unavailable();
    let alert = Arc::new(RecordingAlert::default());
    let mut svc = MonitorService::new(Engine::new(sensor, ManualClock::default()), alert);
    assert_eq!(
        svc.handle_command(start(false)),
        Err(Error::Sensor(SensorError::Unavailable))
    );
    assert!(!svc.is_monitoring());
}

#[test]
fn tuning_commands_reach_live_detector() {
    let (mut svc, handle, alert) = mock_service();
    svc.handle_command(start(false)).unwrap();
    svc.handle_command(MonitorCommand::UpdateThresholds(ThresholdsPatch {
        cooldown_ms: Some(1000),
        ..ThresholdsPatch::default()
    }))
    .unwrap();
    feed_reference(&handle);
    svc.engine().flush().unwrap();
    assert_eq!(svc.engine().config().unwrap().cooldown_ms, 1000);
    // 2300 is still inside the shortened cooldown; 12300 starts a new
    // observation that never completes.
    assert_eq!(alert.raised(), vec![2100]);
    assert_eq!(svc.engine().status().unwrap().detector.impact_at, 12_300);

    svc.handle_command(MonitorCommand::ResetDetector).unwrap();
    svc.engine().flush().unwrap();
    assert_eq!(svc.engine().status().unwrap().detector.last_trigger, 0);
}

#[test]
fn replayed_trace_end_to_end() {
    let readings: Vec<Reading> = reference_fall()
        .into_iter()
        .map(|(t, g)| Reading::from_g(g).at(t))
        .collect();
    let trace = ReplayTrace {
        settings: MonitorSettings::default(),
        pacing: Pacing::Burst,
        readings,
    };
    let total = trace.readings.len();

    let sensor = ReplaySensor::from_trace(trace);
    let progress = sensor.progress();
    let alert = Arc::new(RecordingAlert::default());
    let engine = Engine::with_sensor(sensor);
    let rec = Recorder::default();
    engine.subscribe(rec.clone());
    let mut svc = MonitorService::new(engine, Arc::clone(&alert));

    svc.handle_command(MonitorCommand::Start(MonitorSettings::default()))
        .unwrap();
    assert_eq!(progress.wait_finished(), total);
    svc.engine().flush().unwrap();
    svc.handle_command(MonitorCommand::Stop).unwrap();

    assert_eq!(alert.raised(), vec![2100]);
    assert_eq!(rec.samples(), total);
    assert!(!svc.is_monitoring());
}
