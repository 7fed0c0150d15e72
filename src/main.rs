//! FallWatch host runner.
//!
//! Replays a recorded accelerometer trace through the detection engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ReplaySensor ──▶ Engine (worker · FallDetector) ──▶ LogListener
//! │                        │                                 │
//! │                        └──▶ MonitorService ──▶ LogAlert  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `fallwatch <trace.json>`.  The trace is a [`ReplayTrace`]:
//! `{"settings":{"sensitivity":5,"test_mode":false},"pacing":"burst",
//! "readings":[{"t":0,"x":0.0,"y":0.0,"z":9.8}, ...]}`.
//! Log verbosity follows `RUST_LOG` (default `info`).
#![deny(unused_must_use)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use fallwatch::adapters::log_sink::{LogAlert, LogListener};
use fallwatch::app::commands::MonitorCommand;
use fallwatch::app::events::EngineEvent;
use fallwatch::app::service::MonitorService;
use fallwatch::engine::Engine;
use fallwatch::sensors::replay::{ReplaySensor, ReplayTrace};

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("FallWatch v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load trace ─────────────────────────────────────────
    let path = std::env::args()
        .nth(1)
        .context("usage: fallwatch <trace.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let trace: ReplayTrace =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    let settings = trace.settings;
    info!(
        "trace {path}: {} readings, sensitivity={} test_mode={}",
        trace.readings.len(),
        settings.sensitivity,
        settings.test_mode
    );

    // ── 3. Wire adapters ──────────────────────────────────────
    let sensor = ReplaySensor::from_trace(trace);
    let progress = sensor.progress();
    let engine = Engine::with_sensor(sensor);

    let impacts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&impacts);
    let _log = engine.subscribe(LogListener::new());
    let _impacts = engine.subscribe(move |event: &EngineEvent| {
        if matches!(event, EngineEvent::Impact { .. }) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    let alert = Arc::new(LogAlert::new());
    let mut service = MonitorService::new(engine, Arc::clone(&alert));

    // ── 4. Run ────────────────────────────────────────────────
    service
        .handle_command(MonitorCommand::Start(settings))
        .context("starting monitor")?;
    let delivered = progress.wait_finished();
    service.engine().flush().context("draining engine")?;
    let status = service.engine().status();
    service
        .handle_command(MonitorCommand::Stop)
        .context("stopping monitor")?;

    // ── 5. Summary ────────────────────────────────────────────
    let summary = serde_json::json!({
        "readings": progress.total(),
        "delivered": delivered,
        "processed": status.map(|s| s.samples_processed),
        "dropped": status.map(|s| s.readings_dropped),
        "impacts": impacts.load(Ordering::Relaxed),
        "falls": alert.raised(),
        "last_trigger": status.map(|s| s.detector.last_trigger),
    });
    println!("{summary}");
    Ok(())
}
