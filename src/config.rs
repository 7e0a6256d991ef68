// src/config.rs
use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Axis response curve: offset from neutral -> angular speed.
#[derive(Debug, Clone, Copy)]
pub struct AxisResponse {
    pub deadzone: f64,
    pub max_effect: f64,
    pub response_exp: f64,
    pub max_speed_deg: f64,
}

#[derive(Debug, Clone)]
pub struct ControlConfig {
    // Landmark smoothing
    pub landmark_alpha: f64,
    pub min_hand_score: f64,

    // Classifier, all relative to palm scale
    pub palm_scale_floor: f64,
    pub finger_extend_margin: f64,
    pub two_finger_pinch_ratio: f64,
    pub pinch_ratio: f64,
    pub fist_max_tip_ratio: f64,

    // Zoom / amplitude
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub amp_min: f64,
    pub amp_max: f64,
    pub zoom_power: f64,
    pub amp_power: f64,
    pub metric_floor: f64,
    pub ratio_deadband: f64,
    pub ratio_min: f64,
    pub ratio_max: f64,
    pub snap_marks: Vec<f64>,
    pub snap_window: f64,
    pub snap_strength: f64,
    pub zoom_lerp: f64,
    pub amp_lerp: f64,

    // Rotation / pitch
    pub centroid_alpha: f64,
    pub yaw: AxisResponse,
    pub pitch: AxisResponse,
    pub pitch_center_y: f64,
    pub pitch_min_deg: f64,
    pub pitch_max_deg: f64,
    pub zoom_damping_exp: f64,
    pub zoom_damping_floor: f64,
    pub max_step_dt: f64,

    // Discrete toggles
    pub hold_duration: f64,
    pub release_reset_duration: f64,
    pub toggle_cooldown: f64,
    pub step_cooldown: f64,
    pub double_pinch_window: f64,

    // Export
    pub export_rate_hz: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            landmark_alpha: 0.55,
            min_hand_score: 0.6,

            palm_scale_floor: 1e-4,
            finger_extend_margin: 0.08,
            two_finger_pinch_ratio: 0.36,
            pinch_ratio: 0.32,
            fist_max_tip_ratio: 1.85,

            zoom_min: 0.05,
            zoom_max: 2.6,
            amp_min: 0.2,
            amp_max: 3.0,
            zoom_power: 1.55,
            amp_power: 1.2,
            metric_floor: 1e-3,
            ratio_deadband: 0.03,
            ratio_min: 0.35,
            ratio_max: 2.8,
            snap_marks: vec![0.5, 1.0, 1.5, 2.0, 2.5],
            snap_window: 0.06,
            snap_strength: 0.6,
            zoom_lerp: 0.28,
            amp_lerp: 0.25,

            centroid_alpha: 0.35,
            yaw: AxisResponse {
                deadzone: 0.038,
                max_effect: 0.26,
                response_exp: 0.78,
                max_speed_deg: 225.0,
            },
            pitch: AxisResponse {
                deadzone: 0.045,
                max_effect: 0.24,
                response_exp: 0.85,
                max_speed_deg: 120.0,
            },
            pitch_center_y: 0.5,
            pitch_min_deg: -65.0,
            pitch_max_deg: 65.0,
            zoom_damping_exp: 0.55,
            zoom_damping_floor: 0.35,
            max_step_dt: 0.25,

            hold_duration: 0.6,
            release_reset_duration: 0.35,
            toggle_cooldown: 1.2,
            step_cooldown: 0.28,
            double_pinch_window: 0.65,

            export_rate_hz: 30.0,
        }
    }
}

impl ControlConfig {
    /// Rejects configurations the engines cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bounds("zoom", self.zoom_min, self.zoom_max)?;
        check_bounds("wave_amp", self.amp_min, self.amp_max)?;
        check_bounds("ratio", self.ratio_min, self.ratio_max)?;
        check_bounds("pitch_deg", self.pitch_min_deg, self.pitch_max_deg)?;

        check_positive("zoom_min", self.zoom_min)?;
        check_positive("palm_scale_floor", self.palm_scale_floor)?;
        check_positive("metric_floor", self.metric_floor)?;
        check_positive("hold_duration", self.hold_duration)?;
        check_positive("release_reset_duration", self.release_reset_duration)?;
        check_positive("export_rate_hz", self.export_rate_hz)?;
        check_positive("max_step_dt", self.max_step_dt)?;

        check_fraction("landmark_alpha", self.landmark_alpha)?;
        check_fraction("centroid_alpha", self.centroid_alpha)?;
        check_fraction("zoom_lerp", self.zoom_lerp)?;
        check_fraction("amp_lerp", self.amp_lerp)?;

        for (name, axis) in [("yaw", &self.yaw), ("pitch", &self.pitch)] {
            if axis.max_effect <= axis.deadzone {
                return Err(ConfigError::InvalidBounds {
                    name,
                    min: axis.deadzone,
                    max: axis.max_effect,
                });
            }
        }

        if self.snap_marks.is_empty() {
            return Err(ConfigError::NoSnapMarks);
        }
        Ok(())
    }

    /// Minimum wall-clock spacing between snapshot writes.
    pub fn export_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.export_rate_hz)
    }
}

fn check_bounds(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidBounds { name, min, max });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::InvalidFraction { name, value });
    }
    Ok(())
}

/// Filesystem locations for the control loop's outputs.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub snapshot: PathBuf,
    pub session_dir: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("vision/live_controls.txt"),
            session_dir: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureCam")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl OutputPaths {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `GESTURE_CAM_SNAPSHOT` / `GESTURE_CAM_OUTPUT_DIR`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut paths = Self::default();
        if let Some(p) = lookup("GESTURE_CAM_SNAPSHOT") {
            paths.snapshot = PathBuf::from(p);
        }
        if let Some(p) = lookup("GESTURE_CAM_OUTPUT_DIR") {
            paths.session_dir = PathBuf::from(p);
        }
        paths
    }
}

/// JSON-lines replay named by `GESTURE_CAM_REPLAY`; unset or empty means
/// simulated input.
pub fn replay_path_from_env() -> Option<PathBuf> {
    replay_path(|key| std::env::var(key).ok())
}

pub fn replay_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup("GESTURE_CAM_REPLAY")
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ControlConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_zoom_bounds_rejected() {
        let cfg = ControlConfig { zoom_min: 3.0, zoom_max: 2.0, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBounds { name: "zoom", .. })
        ));
    }

    #[test]
    fn zero_alpha_rejected() {
        let cfg = ControlConfig { landmark_alpha: 0.0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidFraction { .. })));
    }

    #[test]
    fn deadzone_past_max_effect_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.yaw.deadzone = 0.3;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidBounds { name: "yaw", .. })));
    }

    #[test]
    fn export_interval_from_rate() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.export_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn env_overrides_output_paths() {
        let paths = OutputPaths::from_lookup(|key| match key {
            "GESTURE_CAM_SNAPSHOT" => Some("/tmp/snap.txt".into()),
            _ => None,
        });
        assert_eq!(paths.snapshot, PathBuf::from("/tmp/snap.txt"));
        assert_eq!(paths.session_dir, OutputPaths::default().session_dir);
    }

    #[test]
    fn replay_path_comes_from_env() {
        let set = |key: &str| (key == "GESTURE_CAM_REPLAY").then(|| "run.jsonl".to_string());
        assert_eq!(replay_path(set), Some(PathBuf::from("run.jsonl")));
        assert_eq!(replay_path(|_| None), None);
        assert_eq!(replay_path(|_| Some("  ".into())), None);
    }
}
