// src/main.rs
use anyhow::{Context, Result};
use chrono::Utc;
use gesture_cam::config::replay_path_from_env;
use gesture_cam::{
    ControlConfig, GestureController, HandSource, OutputPaths, ReplaySource, SessionRecorder,
    SimulatedSource, SnapshotWriter,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME_RATE: f64 = 30.0;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let paths = OutputPaths::from_env();
    let mut controller = GestureController::new(ControlConfig::default()).context("invalid control configuration")?;

    let mut source: Box<dyn HandSource> = match replay_path_from_env() {
        Some(path) => {
            tracing::info!(path = %path.display(), "replaying recorded hand frames");
            Box::new(ReplaySource::open(&path).context("failed to open replay")?)
        }
        None => {
            tracing::info!("no replay given, running simulated gestures");
            Box::new(SimulatedSource::new(false))
        }
    };

    let mut exporter = SnapshotWriter::new(&paths.snapshot, controller.config().export_interval());
    let mut recorder = match SessionRecorder::create(&paths.session_dir, None) {
        Ok(recorder) => Some(recorder),
        Err(e) => {
            tracing::warn!(error = %e, dir = %paths.session_dir.display(), "session recording disabled");
            None
        }
    };
    tracing::info!(snapshot = %exporter.path().display(), "control loop starting");

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / FRAME_RATE));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("quit signal received");
                break;
            }
            _ = ticker.tick() => {
                let frame = match source.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        tracing::info!("pose source exhausted");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping bad frame");
                        continue;
                    }
                };

                let state = controller.update(&frame.hands, frame.t);
                exporter.maybe_write(state, Utc::now().timestamp_millis());
                if let Some(rec) = recorder.as_mut() {
                    if let Err(e) = rec.record(state, frame.t) {
                        tracing::warn!(error = %e, "session recording stopped");
                        recorder = None;
                    }
                }
            }
        }
    }

    if let Some(recorder) = recorder {
        let summary = recorder.summary();
        tracing::info!(
            session = recorder.session_name(),
            frames = summary.frames,
            zoom_frames = summary.zoom_frames,
            lock_toggles = summary.lock_toggles,
            pause_toggles = summary.pause_toggles,
            increments = summary.increments,
            decrements = summary.decrements,
            "session finished"
        );
        match recorder.finish() {
            Ok(path) => tracing::info!(path = %path.display(), "session exported"),
            Err(e) => tracing::warn!(error = %e, "session export failed"),
        }
    }
    if exporter.failures() > 0 {
        tracing::warn!(failures = exporter.failures(), "some snapshot writes failed");
    }

    Ok(())
}
