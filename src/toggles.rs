// src/toggles.rs - Debounced discrete controls
use crate::config::ControlConfig;
use crate::state::{CameraControlState, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldPhase {
    Released,
    Holding { since: f64 },
    /// Fired; waits for the gesture to stay absent before re-arming.
    Latched { absent_since: Option<f64> },
}

/// Hold-to-toggle: fires once after the gesture is held for `hold_duration`,
/// subject to a cooldown since the previous fire.
#[derive(Debug, Clone)]
pub struct HoldToggle {
    phase: HoldPhase,
    last_fire: Option<f64>,
}

impl Default for HoldToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldToggle {
    pub fn new() -> Self {
        Self {
            phase: HoldPhase::Released,
            last_fire: None,
        }
    }

    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    /// Returns true on the frame the toggle fires.
    pub fn update(&mut self, active: bool, now: f64, config: &ControlConfig) -> bool {
        self.phase = match (self.phase, active) {
            (HoldPhase::Released, false) => HoldPhase::Released,
            (HoldPhase::Released, true) => HoldPhase::Holding { since: now },
            (HoldPhase::Holding { .. }, false) => HoldPhase::Released,
            (HoldPhase::Holding { since }, true) => HoldPhase::Holding { since },
            (HoldPhase::Latched { .. }, true) => HoldPhase::Latched { absent_since: None },
            (HoldPhase::Latched { absent_since }, false) => {
                let absent_since = absent_since.unwrap_or(now);
                if now - absent_since >= config.release_reset_duration {
                    HoldPhase::Released
                } else {
                    HoldPhase::Latched { absent_since: Some(absent_since) }
                }
            }
        };

        let HoldPhase::Holding { since } = self.phase else {
            return false;
        };
        let cooled = self
            .last_fire
            .map_or(true, |t| now - t >= config.toggle_cooldown);
        if now - since >= config.hold_duration && cooled {
            self.phase = HoldPhase::Latched { absent_since: None };
            self.last_fire = Some(now);
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    None,
    Accepted,
    SuppressedZooming,
    SuppressedCooldown,
}

/// Rising-edge pinch detector for one labeled hand.
#[derive(Debug, Clone, Default)]
pub struct PinchStepper {
    was_pinching: bool,
    last_step: Option<f64>,
    // Display-only sequence tracking; never alters the counters.
    pending: u32,
    deadline: Option<f64>,
}

impl PinchStepper {
    pub fn update(&mut self, pinching: bool, zooming: bool, now: f64, config: &ControlConfig) -> StepOutcome {
        let rising = pinching && !self.was_pinching;
        self.was_pinching = pinching;
        if !rising {
            return StepOutcome::None;
        }
        if zooming {
            return StepOutcome::SuppressedZooming;
        }
        if self.last_step.is_some_and(|t| now - t < config.step_cooldown) {
            return StepOutcome::SuppressedCooldown;
        }
        self.last_step = Some(now);
        self.pending += 1;
        self.deadline = Some(now + config.double_pinch_window);
        StepOutcome::Accepted
    }

    /// Advances the pending-sequence display state.
    pub fn sequence_status(&mut self, now: f64) -> Option<StepStatus> {
        if self.pending >= 2 {
            self.pending = 0;
            self.deadline = None;
            return Some(StepStatus::DoublePinchDetected);
        }
        match self.deadline {
            Some(deadline) if self.pending == 1 && now < deadline => Some(StepStatus::SinglePinchPending),
            Some(_) => {
                self.pending = 0;
                self.deadline = None;
                None
            }
            None => None,
        }
    }
}

/// Right pinch increments, Left pinch decrements.
#[derive(Debug, Clone, Default)]
pub struct StepCounters {
    right: PinchStepper,
    left: PinchStepper,
}

impl StepCounters {
    pub fn update(
        &mut self,
        right_pinching: bool,
        left_pinching: bool,
        zooming: bool,
        now: f64,
        state: &mut CameraControlState,
        config: &ControlConfig,
    ) {
        let right = self.right.update(right_pinching, zooming, now, config);
        let left = self.left.update(left_pinching, zooming, now, config);

        if right == StepOutcome::Accepted {
            state.inc_count += 1;
            tracing::info!(count = state.inc_count, "step increment");
        }
        if left == StepOutcome::Accepted {
            state.dec_count += 1;
            tracing::info!(count = state.dec_count, "step decrement");
        }

        let sequence = merge_sequence(self.right.sequence_status(now), self.left.sequence_status(now));

        state.step_status = if sequence == Some(StepStatus::DoublePinchDetected) {
            StepStatus::DoublePinchDetected
        } else if right == StepOutcome::Accepted {
            StepStatus::Increment
        } else if left == StepOutcome::Accepted {
            StepStatus::Decrement
        } else if right == StepOutcome::SuppressedZooming || left == StepOutcome::SuppressedZooming {
            StepStatus::SuppressedZooming
        } else if right == StepOutcome::SuppressedCooldown || left == StepOutcome::SuppressedCooldown {
            StepStatus::SuppressedCooldown
        } else {
            sequence.unwrap_or(StepStatus::Idle)
        };
    }
}

fn merge_sequence(right: Option<StepStatus>, left: Option<StepStatus>) -> Option<StepStatus> {
    match (right, left) {
        (Some(StepStatus::DoublePinchDetected), _) | (_, Some(StepStatus::DoublePinchDetected)) => {
            Some(StepStatus::DoublePinchDetected)
        }
        (Some(s), _) | (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.05;

    fn run<F: Fn(f64) -> bool>(toggle: &mut HoldToggle, config: &ControlConfig, until: f64, active: F) -> usize {
        let mut fires = 0;
        let mut i = 0;
        loop {
            let t = i as f64 * DT;
            if t > until {
                return fires;
            }
            if toggle.update(active(t), t, config) {
                fires += 1;
            }
            i += 1;
        }
    }

    #[test]
    fn short_hold_never_fires() {
        let config = ControlConfig::default();
        let mut toggle = HoldToggle::new();
        assert_eq!(run(&mut toggle, &config, 3.0, |t| t < 0.52 || (t > 1.0 && t < 1.52)), 0);
    }

    #[test]
    fn sustained_hold_fires_once() {
        let config = ControlConfig::default();
        let mut toggle = HoldToggle::new();
        assert_eq!(run(&mut toggle, &config, 6.0, |_| true), 1);
        assert!(matches!(toggle.phase(), HoldPhase::Latched { .. }));
    }

    #[test]
    fn cooldown_blocks_second_hold() {
        let config = ControlConfig { toggle_cooldown: 1.5, ..Default::default() };
        let mut toggle = HoldToggle::new();
        let fires = run(&mut toggle, &config, 3.0, |t| t < 0.68 || (t > 1.18 && t < 1.97));
        assert_eq!(fires, 1);
    }

    #[test]
    fn second_hold_fires_after_cooldown() {
        let config = ControlConfig { toggle_cooldown: 1.5, ..Default::default() };
        let mut toggle = HoldToggle::new();
        let fires = run(&mut toggle, &config, 3.0, |t| t < 0.68 || (t > 1.18 && t < 2.32));
        assert_eq!(fires, 2);
    }

    #[test]
    fn brief_gap_keeps_latch() {
        let config = ControlConfig { toggle_cooldown: 0.1, ..Default::default() };
        let mut toggle = HoldToggle::new();
        // 0.2s gaps are shorter than the release reset.
        let fires = run(&mut toggle, &config, 4.0, |t| !(1.0..1.2).contains(&t) && !(2.0..2.2).contains(&t));
        assert_eq!(fires, 1);
    }

    #[test]
    fn edge_triggered_once_per_pinch() {
        let config = ControlConfig::default();
        let mut counters = StepCounters::default();
        let mut state = CameraControlState::new();
        for i in 0..60 {
            counters.update(true, false, false, i as f64 * DT, &mut state, &config);
        }
        assert_eq!(state.inc_count, 1);

        counters.update(false, false, false, 3.0, &mut state, &config);
        counters.update(true, false, false, 3.05, &mut state, &config);
        assert_eq!(state.inc_count, 2);
        assert_eq!(state.dec_count, 0);
    }

    #[test]
    fn zooming_suppresses_steps() {
        let config = ControlConfig::default();
        let mut counters = StepCounters::default();
        let mut state = CameraControlState::new();
        counters.update(true, true, true, 0.0, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::SuppressedZooming);
        counters.update(false, false, true, 0.1, &mut state, &config);
        counters.update(false, true, true, 0.2, &mut state, &config);
        assert_eq!(state.inc_count, 0);
        assert_eq!(state.dec_count, 0);
    }

    #[test]
    fn cooldown_suppresses_rapid_steps() {
        let config = ControlConfig::default();
        let mut counters = StepCounters::default();
        let mut state = CameraControlState::new();
        counters.update(false, true, false, 0.0, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::Decrement);
        counters.update(false, false, false, 0.05, &mut state, &config);
        counters.update(false, true, false, 0.1, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::SuppressedCooldown);
        assert_eq!(state.dec_count, 1);
    }

    #[test]
    fn double_pinch_is_display_only() {
        let config = ControlConfig::default();
        let mut counters = StepCounters::default();
        let mut state = CameraControlState::new();
        counters.update(true, false, false, 0.0, &mut state, &config);
        counters.update(false, false, false, 0.1, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::SinglePinchPending);
        counters.update(false, false, false, 0.3, &mut state, &config);
        counters.update(true, false, false, 0.4, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::DoublePinchDetected);
        assert_eq!(state.inc_count, 2);

        counters.update(false, false, false, 0.5, &mut state, &config);
        assert_eq!(state.step_status, StepStatus::Idle);
    }

    #[test]
    fn pending_expires_after_window() {
        let config = ControlConfig::default();
        let mut stepper = PinchStepper::default();
        assert_eq!(stepper.update(true, false, 0.0, &config), StepOutcome::Accepted);
        assert_eq!(stepper.sequence_status(0.3), Some(StepStatus::SinglePinchPending));
        assert_eq!(stepper.sequence_status(1.0), None);
        assert_eq!(stepper.sequence_status(1.1), None);
    }
}
