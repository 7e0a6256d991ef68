// src/export.rs - Live control snapshot for external renderers
use crate::error::ExportError;
use crate::state::CameraControlState;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Flat record of the control state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSnapshot {
    pub timestamp_ms: i64,
    pub zoom: f64,
    pub rotation_deg: f64,
    pub pitch_deg: f64,
    pub wave_amp: f64,
    pub paused: bool,
    pub camera_locked: bool,
    pub zoom_line: Option<[(f64, f64); 2]>,
    pub label: String,
    pub gesture: String,
    pub pinch_ratio: f64,
    pub inc_count: u32,
    pub dec_count: u32,
}

impl ControlSnapshot {
    pub fn capture(state: &CameraControlState, timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            zoom: state.zoom(),
            rotation_deg: state.rotation_deg(),
            pitch_deg: state.pitch_deg(),
            wave_amp: state.wave_amp(),
            paused: state.paused(),
            camera_locked: state.camera_locked(),
            zoom_line: state.zoom_line.map(|[a, b]| [(a.x, a.y), (b.x, b.y)]),
            label: state.control_label.to_string(),
            gesture: state.control_gesture.to_string(),
            pinch_ratio: state.pinch_ratio,
            inc_count: state.inc_count,
            dec_count: state.dec_count,
        }
    }

    /// `key=value` lines, one field per line.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ControlSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [(ax, ay), (bx, by)] = self.zoom_line.unwrap_or([(0.5, 0.5), (0.5, 0.5)]);
        let flag = |b: bool| if b { 1 } else { 0 };

        writeln!(f, "timestamp_ms={}", self.timestamp_ms)?;
        writeln!(f, "zoom={:.4}", self.zoom)?;
        writeln!(f, "rotation_deg={:.4}", self.rotation_deg)?;
        writeln!(f, "pitch_deg={:.4}", self.pitch_deg)?;
        writeln!(f, "wave_amp={:.4}", self.wave_amp)?;
        writeln!(f, "paused={}", flag(self.paused))?;
        writeln!(f, "camera_locked={}", flag(self.camera_locked))?;
        writeln!(f, "zoom_line_active={}", flag(self.zoom_line.is_some()))?;
        writeln!(f, "zoom_line_ax={:.4}", ax)?;
        writeln!(f, "zoom_line_ay={:.4}", ay)?;
        writeln!(f, "zoom_line_bx={:.4}", bx)?;
        writeln!(f, "zoom_line_by={:.4}", by)?;
        writeln!(f, "label={}", self.label)?;
        writeln!(f, "gesture={}", self.gesture)?;
        writeln!(f, "pinch_ratio={:.4}", self.pinch_ratio)?;
        writeln!(f, "n_inc_count={}", self.inc_count)?;
        writeln!(f, "n_dec_count={}", self.dec_count)
    }
}

/// Writes `contents` to a temporary sibling of `path`, then renames it into
/// place so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ExportError> {
    let parent = path
        .parent()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .ok_or_else(|| ExportError::NoParent(path.to_path_buf()))?;
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ExportError::NoParent(path.to_path_buf()))?
        .to_string_lossy();
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Rate-limited, best-effort snapshot sink. The rate limit runs on the
/// monotonic wall clock, independent of frame timestamps.
pub struct SnapshotWriter {
    path: PathBuf,
    min_interval: Duration,
    last_write: Option<Instant>,
    failures: u64,
}

impl SnapshotWriter {
    pub fn new(path: impl AsRef<Path>, min_interval: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            min_interval,
            last_write: None,
            failures: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn maybe_write(&mut self, state: &CameraControlState, timestamp_ms: i64) -> bool {
        self.maybe_write_at(state, Instant::now(), timestamp_ms)
    }

    /// Writes unless the previous write was less than one interval before
    /// `now`. Returns whether a write was attempted. Errors are logged and
    /// dropped.
    pub fn maybe_write_at(&mut self, state: &CameraControlState, now: Instant, timestamp_ms: i64) -> bool {
        if self
            .last_write
            .is_some_and(|t| now.saturating_duration_since(t) < self.min_interval)
        {
            return false;
        }
        self.last_write = Some(now);

        let snapshot = ControlSnapshot::capture(state, timestamp_ms);
        if let Err(e) = write_atomic(&self.path, &snapshot.to_text()) {
            self.failures += 1;
            // First failure loud, the rest quiet.
            if self.failures == 1 {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot write failed");
            } else {
                tracing::debug!(path = %self.path.display(), error = %e, "snapshot write failed");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::controller::GestureController;
    use nalgebra::Vector2;
    use std::collections::HashMap;

    fn parse(text: &str) -> HashMap<String, String> {
        text.lines()
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn snapshot_has_every_field() {
        let mut state = CameraControlState::new();
        state.set_zoom(1.8, &ControlConfig::default());
        state.zoom_line = Some([Vector2::new(0.25, 0.5), Vector2::new(0.75, 0.5)]);
        state.inc_count = 3;

        let text = ControlSnapshot::capture(&state, 1_700_000_000_123).to_text();
        let fields = parse(&text);
        assert_eq!(fields.len(), 17);
        assert_eq!(fields["timestamp_ms"], "1700000000123");
        assert_eq!(fields["zoom"], "1.8000");
        assert_eq!(fields["zoom_line_active"], "1");
        assert_eq!(fields["zoom_line_bx"], "0.7500");
        assert_eq!(fields["label"], "Unknown");
        assert_eq!(fields["gesture"], "none");
        assert_eq!(fields["paused"], "0");
        assert_eq!(fields["n_inc_count"], "3");
    }

    #[test]
    fn inactive_zoom_line_is_centered() {
        let text = ControlSnapshot::capture(&CameraControlState::new(), 1).to_text();
        let fields = parse(&text);
        assert_eq!(fields["zoom_line_active"], "0");
        assert_eq!(fields["zoom_line_ax"], "0.5000");
    }

    #[test]
    fn atomic_write_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vision").join("live_controls.txt");
        write_atomic(&path, "a=1\n").unwrap();
        write_atomic(&path, "a=2\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a=2\n");

        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    fn interval() -> Duration {
        ControlConfig::default().export_interval()
    }

    #[test]
    fn writes_are_rate_limited() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path().join("live.txt"), interval());
        let state = CameraControlState::new();
        let start = Instant::now();
        assert!(writer.maybe_write_at(&state, start, 1));
        assert!(!writer.maybe_write_at(&state, start + Duration::from_millis(10), 2));
        assert!(writer.maybe_write_at(&state, start + Duration::from_millis(40), 3));
        let fields = parse(&fs::read_to_string(writer.path()).unwrap());
        assert_eq!(fields["timestamp_ms"], "3");
    }

    #[test]
    fn writes_continue_when_frame_clock_rewinds() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path().join("live.txt"), interval());
        let mut controller = GestureController::new(ControlConfig::default()).unwrap();
        let start = Instant::now();

        let state = controller.update(&[], 100.0);
        assert!(writer.maybe_write_at(state, start, 0));

        // Replay restarts its clock at zero; wall time keeps moving forward.
        let mut writes = 0;
        for i in 1..=300 {
            let state = controller.update(&[], (i - 1) as f64 / 30.0);
            let now = start + Duration::from_millis(40 * i);
            if writer.maybe_write_at(state, now, i as i64) {
                writes += 1;
            }
        }
        assert_eq!(writes, 300);
        assert_eq!(writer.failures(), 0);
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory sits where the file should go.
        let blocked = dir.path().join("blocked");
        fs::create_dir_all(blocked.join("inner")).unwrap();
        let mut writer = SnapshotWriter::new(&blocked, interval());
        assert!(writer.maybe_write(&CameraControlState::new(), 1));
        assert_eq!(writer.failures(), 1);
    }
}
