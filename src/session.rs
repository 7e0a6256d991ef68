// src/session.rs
use crate::error::ExportError;
use crate::state::CameraControlState;
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Rows buffered between flushes to disk.
const FLUSH_EVERY: u64 = 30;

#[derive(Debug, Clone, Serialize)]
struct ControlRecord {
    frame: u64,
    time_s: f64,
    zoom: f64,
    target_zoom: f64,
    rotation_deg: f64,
    pitch_deg: f64,
    wave_amp: f64,
    paused: bool,
    camera_locked: bool,
    zoom_line_active: bool,
    label: String,
    gesture: String,
    pinch_ratio: f64,
    inc_count: u32,
    dec_count: u32,
    step_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub frames: u64,
    pub zoom_frames: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub lock_toggles: u64,
    pub pause_toggles: u64,
    pub increments: u32,
    pub decrements: u32,
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self {
            frames: 0,
            zoom_frames: 0,
            min_zoom: f64::INFINITY,
            max_zoom: f64::NEG_INFINITY,
            lock_toggles: 0,
            pause_toggles: 0,
            increments: 0,
            decrements: 0,
        }
    }
}

/// Appends one CSV row per frame to `<output>/<session>/controls.csv`.
///
/// Rows are flushed every `FLUSH_EVERY` frames, so a crash loses at most
/// the last partial batch. Only running totals are kept in memory.
pub struct SessionRecorder {
    session_name: String,
    csv_path: PathBuf,
    writer: Writer<File>,
    summary: SessionSummary,
    last_flags: Option<(bool, bool)>,
}

impl SessionRecorder {
    pub fn create(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Result<Self, ExportError> {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        let session_dir = output_dir.as_ref().join(&session_name);
        fs::create_dir_all(&session_dir)?;
        let csv_path = session_dir.join("controls.csv");
        let writer = Writer::from_writer(File::create(&csv_path)?);

        Ok(Self {
            session_name,
            csv_path,
            writer,
            summary: SessionSummary::default(),
            last_flags: None,
        })
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn len(&self) -> u64 {
        self.summary.frames
    }

    pub fn is_empty(&self) -> bool {
        self.summary.frames == 0
    }

    pub fn record(&mut self, state: &CameraControlState, time_s: f64) -> Result<(), ExportError> {
        let record = ControlRecord {
            frame: self.summary.frames,
            time_s,
            zoom: state.zoom(),
            target_zoom: state.target_zoom,
            rotation_deg: state.rotation_deg(),
            pitch_deg: state.pitch_deg(),
            wave_amp: state.wave_amp(),
            paused: state.paused(),
            camera_locked: state.camera_locked(),
            zoom_line_active: state.zoom_line_active(),
            label: state.control_label.to_string(),
            gesture: state.control_gesture.to_string(),
            pinch_ratio: state.pinch_ratio,
            inc_count: state.inc_count,
            dec_count: state.dec_count,
            step_status: state.step_status.as_str().to_string(),
        };
        self.writer.serialize(&record)?;
        self.tally(&record);

        if self.summary.frames % FLUSH_EVERY == 0 {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn tally(&mut self, record: &ControlRecord) {
        let s = &mut self.summary;
        s.frames += 1;
        if record.zoom_line_active {
            s.zoom_frames += 1;
        }
        s.min_zoom = s.min_zoom.min(record.zoom);
        s.max_zoom = s.max_zoom.max(record.zoom);
        if let Some((locked, paused)) = self.last_flags {
            s.lock_toggles += u64::from(locked != record.camera_locked);
            s.pause_toggles += u64::from(paused != record.paused);
        }
        s.increments = record.inc_count;
        s.decrements = record.dec_count;
        self.last_flags = Some((record.camera_locked, record.paused));
    }

    /// Flushes outstanding rows and returns the CSV path.
    pub fn finish(mut self) -> Result<PathBuf, ExportError> {
        self.writer.flush()?;
        Ok(self.csv_path)
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary.clone()
    }
}
