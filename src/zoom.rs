// src/zoom.rs - Dual-hand pinch zoom
use crate::config::ControlConfig;
use crate::gesture::TrackedHand;
use crate::selection::top_two;
use crate::state::CameraControlState;
use nalgebra::Vector2;

/// Two pinching hands driving zoom.
#[derive(Debug, Clone)]
pub struct ZoomPair {
    pub a: Vector2<f64>,
    pub b: Vector2<f64>,
    /// Pinch-point separation over mean palm scale.
    pub metric: f64,
}

impl ZoomPair {
    pub fn from_hands(first: &TrackedHand, second: &TrackedHand) -> Self {
        let a = first.features.pinch_point;
        let b = second.features.pinch_point;
        let mean_palm = (first.features.palm_scale + second.features.palm_scale) * 0.5;
        Self { a, b, metric: (a - b).norm() / mean_palm }
    }

    pub fn midpoint(&self) -> Vector2<f64> {
        (self.a + self.b) * 0.5
    }
}

/// Pairs the two highest-score pinching hands, if there are two.
pub fn find_zoom_pair(hands: &[TrackedHand], config: &ControlConfig) -> Option<ZoomPair> {
    let (first, second) = top_two(hands.iter().filter(|h| h.is_pinching(config)))?;
    Some(ZoomPair::from_hands(first, second))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomPhase {
    Idle,
    Active {
        anchor_metric: f64,
        anchor_zoom: f64,
        anchor_amp: f64,
    },
}

pub struct ZoomEngine {
    phase: ZoomPhase,
}

impl Default for ZoomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomEngine {
    pub fn new() -> Self {
        Self { phase: ZoomPhase::Idle }
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, ZoomPhase::Active { .. })
    }

    /// Advances one frame. Returns true on the frame a session starts.
    ///
    /// Going idle keeps zoom and amplitude where they are, so the next
    /// session anchors to the current values rather than to neutral.
    pub fn update(
        &mut self,
        pair: Option<&ZoomPair>,
        state: &mut CameraControlState,
        config: &ControlConfig,
    ) -> bool {
        let Some(pair) = pair else {
            if self.is_active() {
                tracing::debug!(zoom = state.zoom(), "zoom session ended");
            }
            self.phase = ZoomPhase::Idle;
            state.zoom_line = None;
            return false;
        };

        let started = !self.is_active();
        let (anchor_metric, anchor_zoom, anchor_amp) = match self.phase {
            ZoomPhase::Active { anchor_metric, anchor_zoom, anchor_amp } => {
                (anchor_metric, anchor_zoom, anchor_amp)
            }
            ZoomPhase::Idle => {
                let anchor_metric = pair.metric.max(config.metric_floor);
                self.phase = ZoomPhase::Active {
                    anchor_metric,
                    anchor_zoom: state.zoom(),
                    anchor_amp: state.wave_amp(),
                };
                tracing::debug!(metric = pair.metric, zoom = state.zoom(), "zoom session started");
                (anchor_metric, state.zoom(), state.wave_amp())
            }
        };

        let ratio = shape_ratio(pair.metric, anchor_metric, config);
        let target_zoom = snap_zoom(target_zoom(anchor_zoom, ratio, config), config);
        let target_amp = target_amp(anchor_amp, ratio, config);

        state.target_zoom = target_zoom;
        let zoom = lerp(state.zoom(), target_zoom, config.zoom_lerp);
        state.set_zoom(zoom, config);
        let amp = lerp(state.wave_amp(), target_amp, config.amp_lerp);
        state.set_wave_amp(amp, config);
        state.zoom_line = Some([pair.a, pair.b]);

        started
    }
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Anchor-relative ratio with deadband snap and clamp.
pub fn shape_ratio(metric: f64, anchor_metric: f64, config: &ControlConfig) -> f64 {
    let mut ratio = metric / anchor_metric;
    if (ratio - 1.0).abs() < config.ratio_deadband {
        ratio = 1.0;
    }
    ratio.clamp(config.ratio_min, config.ratio_max)
}

pub fn target_zoom(anchor_zoom: f64, ratio: f64, config: &ControlConfig) -> f64 {
    (anchor_zoom * ratio.powf(config.zoom_power)).clamp(config.zoom_min, config.zoom_max)
}

pub fn target_amp(anchor_amp: f64, ratio: f64, config: &ControlConfig) -> f64 {
    (anchor_amp * ratio.powf(config.amp_power)).clamp(config.amp_min, config.amp_max)
}

/// Pulls a zoom target toward the nearest preset mark when it is inside the
/// snap window, harder the closer it is.
pub fn snap_zoom(target: f64, config: &ControlConfig) -> f64 {
    let nearest = config
        .snap_marks
        .iter()
        .copied()
        .min_by(|a, b| (a - target).abs().total_cmp(&(b - target).abs()));

    let Some(mark) = nearest else {
        return target;
    };
    let distance = (mark - target).abs();
    if distance >= config.snap_window {
        return target;
    }
    let closeness = 1.0 - distance / config.snap_window;
    let snapped = target + (mark - target) * closeness * config.snap_strength;
    snapped.clamp(config.zoom_min, config.zoom_max)
}
