// src/rotation.rs - Yaw/pitch from the zoom pair's centroid
use crate::config::{AxisResponse, ControlConfig};
use crate::state::CameraControlState;
use nalgebra::Vector2;

/// Integrates angular velocity from how far the pinch-pair centroid sits
/// from screen center. Uses wall-clock dt, so it is frame-rate independent.
pub struct RotationDriver {
    centroid: Option<Vector2<f64>>,
}

impl Default for RotationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationDriver {
    pub fn new() -> Self {
        Self { centroid: None }
    }

    /// Seeds the smoothed centroid at the start of a zoom session.
    pub fn anchor(&mut self, midpoint: Vector2<f64>) {
        self.centroid = Some(midpoint);
    }

    pub fn reset(&mut self) {
        self.centroid = None;
    }

    pub fn centroid(&self) -> Option<Vector2<f64>> {
        self.centroid
    }

    pub fn update(
        &mut self,
        midpoint: Vector2<f64>,
        dt: f64,
        state: &mut CameraControlState,
        config: &ControlConfig,
    ) {
        let alpha = config.centroid_alpha;
        let centroid = match self.centroid {
            Some(prev) => prev * (1.0 - alpha) + midpoint * alpha,
            None => midpoint,
        };
        self.centroid = Some(centroid);

        let damping = zoom_damping(state.zoom(), config);
        let yaw_speed = axis_speed(0.5 - centroid.x, &config.yaw) * damping;
        let pitch_speed = axis_speed(config.pitch_center_y - centroid.y, &config.pitch) * damping;

        let dt = dt.clamp(0.0, config.max_step_dt);
        state.set_rotation_deg(state.rotation_deg() + yaw_speed * dt);
        state.set_pitch_deg(state.pitch_deg() + pitch_speed * dt, config);

        tracing::trace!(yaw_speed, pitch_speed, dt, "rotation step");
    }
}

/// Degrees per second for an offset from neutral.
pub fn axis_speed(offset: f64, axis: &AxisResponse) -> f64 {
    let magnitude = offset.abs();
    if magnitude <= axis.deadzone {
        return 0.0;
    }
    let t = ((magnitude - axis.deadzone) / (axis.max_effect - axis.deadzone)).clamp(0.0, 1.0);
    axis.max_speed_deg * t.powf(axis.response_exp) * offset.signum()
}

/// Less sensitive when zoomed in.
pub fn zoom_damping(zoom: f64, config: &ControlConfig) -> f64 {
    (1.0 / zoom.powf(config.zoom_damping_exp)).max(config.zoom_damping_floor)
}
