// src/state.rs
use crate::config::ControlConfig;
use crate::gesture::Gesture;
use crate::hand::HandLabel;
use nalgebra::Vector2;

/// Display text for the single-pinch step machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Idle,
    Increment,
    Decrement,
    SuppressedZooming,
    SuppressedCooldown,
    SinglePinchPending,
    DoublePinchDetected,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Idle => "idle",
            StepStatus::Increment => "pinch: +1",
            StepStatus::Decrement => "pinch: -1",
            StepStatus::SuppressedZooming => "suppressed: zooming",
            StepStatus::SuppressedCooldown => "suppressed: cooldown",
            StepStatus::SinglePinchPending => "single-pinch pending",
            StepStatus::DoublePinchDetected => "double-pinch detected",
        }
    }
}

/// The camera parameters and discrete flags driven by hand gestures.
///
/// Continuous channels are clamped on every write. `paused` and
/// `camera_locked` only change through their toggle machines.
#[derive(Debug, Clone)]
pub struct CameraControlState {
    zoom: f64,
    rotation_deg: f64,
    pitch_deg: f64,
    wave_amp: f64,
    paused: bool,
    camera_locked: bool,

    pub target_zoom: f64,
    pub zoom_line: Option<[Vector2<f64>; 2]>,
    pub control_label: HandLabel,
    pub control_gesture: Gesture,
    pub pinch_ratio: f64,
    pub inc_count: u32,
    pub dec_count: u32,
    pub step_status: StepStatus,
}

impl Default for CameraControlState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation_deg: 0.0,
            pitch_deg: 0.0,
            wave_amp: 1.0,
            paused: false,
            camera_locked: false,
            target_zoom: 1.0,
            zoom_line: None,
            control_label: HandLabel::Unknown,
            control_gesture: Gesture::None,
            pinch_ratio: 0.0,
            inc_count: 0,
            dec_count: 0,
            step_status: StepStatus::Idle,
        }
    }
}

impl CameraControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn pitch_deg(&self) -> f64 {
        self.pitch_deg
    }

    pub fn wave_amp(&self) -> f64 {
        self.wave_amp
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn camera_locked(&self) -> bool {
        self.camera_locked
    }

    pub fn zoom_line_active(&self) -> bool {
        self.zoom_line.is_some()
    }

    pub(crate) fn set_zoom(&mut self, zoom: f64, config: &ControlConfig) {
        self.zoom = zoom.clamp(config.zoom_min, config.zoom_max);
    }

    pub(crate) fn set_wave_amp(&mut self, amp: f64, config: &ControlConfig) {
        self.wave_amp = amp.clamp(config.amp_min, config.amp_max);
    }

    pub(crate) fn set_rotation_deg(&mut self, deg: f64) {
        self.rotation_deg = normalize_deg(deg);
    }

    pub(crate) fn set_pitch_deg(&mut self, deg: f64, config: &ControlConfig) {
        self.pitch_deg = deg.clamp(config.pitch_min_deg, config.pitch_max_deg);
    }

    pub(crate) fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub(crate) fn toggle_camera_locked(&mut self) -> bool {
        self.camera_locked = !self.camera_locked;
        self.camera_locked
    }
}

/// Wraps an angle into (-180, 180].
pub fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let s = CameraControlState::new();
        assert_eq!(s.zoom(), 1.0);
        assert_eq!(s.rotation_deg(), 0.0);
        assert_eq!(s.pitch_deg(), 0.0);
        assert!(!s.paused());
        assert!(!s.camera_locked());
        assert!(!s.zoom_line_active());
    }

    #[test]
    fn normalizes_into_half_open_range() {
        assert_eq!(normalize_deg(180.0), 180.0);
        assert_eq!(normalize_deg(-180.0), 180.0);
        assert!((normalize_deg(190.0) + 170.0).abs() < 1e-9);
        assert!((normalize_deg(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_deg(725.0) - 5.0).abs() < 1e-9);
        assert_eq!(normalize_deg(0.0), 0.0);
    }

    #[test]
    fn setters_clamp() {
        let cfg = ControlConfig::default();
        let mut s = CameraControlState::new();
        s.set_zoom(10.0, &cfg);
        s.set_wave_amp(-1.0, &cfg);
        s.set_pitch_deg(120.0, &cfg);
        assert_eq!(s.zoom(), cfg.zoom_max);
        assert_eq!(s.wave_amp(), cfg.amp_min);
        assert_eq!(s.pitch_deg(), cfg.pitch_max_deg);
    }
}
