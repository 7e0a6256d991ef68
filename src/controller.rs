// src/controller.rs - Per-frame gesture pipeline
use crate::config::ControlConfig;
use crate::error::ConfigError;
use crate::gesture::{analyze, Gesture, TrackedHand};
use crate::hand::{assign_keys, HandLabel, HandObservation};
use crate::rotation::RotationDriver;
use crate::selection::{best_hand_by_label, select_control_hand};
use crate::smoothing::LandmarkSmoother;
use crate::state::CameraControlState;
use crate::toggles::{HoldToggle, StepCounters};
use crate::zoom::{find_zoom_pair, ZoomEngine};
use std::collections::HashSet;

/// Owns the camera control state and every machine that writes to it.
///
/// One `update` per captured frame; stages run in a fixed order because each
/// consumes the previous one's output.
pub struct GestureController {
    config: ControlConfig,
    state: CameraControlState,
    smoother: LandmarkSmoother,
    zoom: ZoomEngine,
    rotation: RotationDriver,
    lock_toggle: HoldToggle,
    pause_toggle: HoldToggle,
    steps: StepCounters,
    hands: Vec<TrackedHand>,
    last_frame: Option<f64>,
}

impl GestureController {
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            smoother: LandmarkSmoother::new(config.landmark_alpha),
            config,
            state: CameraControlState::new(),
            zoom: ZoomEngine::new(),
            rotation: RotationDriver::new(),
            lock_toggle: HoldToggle::new(),
            pause_toggle: HoldToggle::new(),
            steps: StepCounters::default(),
            hands: Vec::new(),
            last_frame: None,
        })
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> &CameraControlState {
        &self.state
    }

    /// Hands that passed the confidence gate this frame.
    pub fn hands(&self) -> &[TrackedHand] {
        &self.hands
    }

    pub fn zoom_active(&self) -> bool {
        self.zoom.is_active()
    }

    /// Runs one frame. `now` is the frame's capture time in seconds.
    pub fn update(&mut self, observations: &[HandObservation], now: f64) -> &CameraControlState {
        let dt = self.last_frame.map_or(0.0, |prev| (now - prev).max(0.0));
        self.last_frame = Some(now);

        self.track_hands(observations);
        self.update_control_hand();

        // Zoom, then rotation on the same pair.
        let pair = find_zoom_pair(&self.hands, &self.config);
        let started = self.zoom.update(pair.as_ref(), &mut self.state, &self.config);
        match &pair {
            Some(pair) if !self.state.camera_locked() => {
                if started {
                    self.rotation.anchor(pair.midpoint());
                }
                self.rotation.update(pair.midpoint(), dt, &mut self.state, &self.config);
            }
            _ => self.rotation.reset(),
        }

        self.update_toggles(now);

        let right = best_hand_by_label(&self.hands, HandLabel::Right).is_some_and(|h| h.is_pinching(&self.config));
        let left = best_hand_by_label(&self.hands, HandLabel::Left).is_some_and(|h| h.is_pinching(&self.config));
        self.steps
            .update(right, left, self.zoom.is_active(), now, &mut self.state, &self.config);

        tracing::trace!(
            hands = self.hands.len(),
            zoom = self.state.zoom(),
            rotation = self.state.rotation_deg(),
            pitch = self.state.pitch_deg(),
            "frame processed"
        );
        &self.state
    }

    fn track_hands(&mut self, observations: &[HandObservation]) {
        let keys = assign_keys(observations);
        self.hands.clear();

        for (obs, &key) in observations.iter().zip(&keys) {
            let landmarks = self.smoother.smooth(key, &obs.landmarks);
            let Some(features) = analyze(&landmarks, &self.config) else {
                continue;
            };
            // NaN scores fail the gate too.
            if !(obs.score >= self.config.min_hand_score) {
                continue;
            }
            self.hands.push(TrackedHand {
                key,
                label: obs.label,
                score: obs.score,
                landmarks,
                features,
            });
        }

        let active: HashSet<_> = keys.into_iter().collect();
        self.smoother.prune(&active);
    }

    fn update_control_hand(&mut self) {
        match select_control_hand(&self.hands) {
            Some(hand) => {
                self.state.control_label = hand.label;
                self.state.control_gesture = hand.gesture();
                self.state.pinch_ratio = hand.features.pinch_ratio;
            }
            None => {
                self.state.control_label = HandLabel::Unknown;
                self.state.control_gesture = Gesture::None;
                self.state.pinch_ratio = 0.0;
            }
        }
    }

    fn update_toggles(&mut self, now: f64) {
        let fists = self.hands.iter().filter(|h| h.gesture() == Gesture::Fist).count();
        let single_fist = self.hands.len() == 1 && fists == 1;
        let double_fist = fists >= 2;

        if self.lock_toggle.update(single_fist, now, &self.config) {
            let locked = self.state.toggle_camera_locked();
            tracing::info!(locked, "camera lock toggled");
        }
        if self.pause_toggle.update(double_fist, now, &self.config) {
            let paused = self.state.toggle_paused();
            tracing::info!(paused, "pause toggled");
        }
    }
}
