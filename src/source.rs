// src/source.rs - Pose sources feeding the control loop
use crate::error::SourceError;
use crate::hand::{HandLabel, HandObservation};
use crate::synthetic::{hand, wrist_for_pinch_point, SyntheticPose};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// One frame of hand observations, `t` in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub t: f64,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

pub trait HandSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// Replays frames recorded as JSON lines.
pub struct ReplaySource<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> HandSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|source| SourceError::Parse {
                    line: self.line_no,
                    source,
                });
        }
        Ok(None)
    }
}

const SIM_FPS: f64 = 30.0;
const SIM_SCALE: f64 = 0.12;
const SIM_SCORE: f64 = 0.92;

#[derive(Debug, Clone, Copy)]
enum Scene {
    OpenHands,
    PinchSpread,
    PinchDrift,
    SingleFist,
    Empty,
    DoubleFist,
    RightTaps,
    LeftTaps,
}

const SCRIPT: [(Scene, f64); 11] = [
    (Scene::OpenHands, 1.5),
    (Scene::PinchSpread, 3.0),
    (Scene::PinchDrift, 2.5),
    (Scene::OpenHands, 1.0),
    (Scene::SingleFist, 1.2),
    (Scene::Empty, 0.8),
    (Scene::DoubleFist, 1.2),
    (Scene::Empty, 0.8),
    (Scene::RightTaps, 2.0),
    (Scene::LeftTaps, 2.0),
    (Scene::Empty, 0.5),
];

/// Scripted demo gestures built from synthetic hands.
pub struct SimulatedSource {
    sim_time: f64,
    repeat: bool,
}

impl SimulatedSource {
    pub fn new(repeat: bool) -> Self {
        Self { sim_time: 0.0, repeat }
    }

    pub fn script_duration() -> f64 {
        SCRIPT.iter().map(|(_, d)| d).sum()
    }

    fn scene_at(&self, t: f64) -> Option<(Scene, f64, f64)> {
        let mut start = 0.0;
        for &(scene, duration) in SCRIPT.iter() {
            if t < start + duration {
                return Some((scene, t - start, duration));
            }
            start += duration;
        }
        None
    }

    fn hands_for(scene: Scene, local: f64, duration: f64) -> Vec<HandObservation> {
        let progress = (local / duration).clamp(0.0, 1.0);
        let at = |label, x, y, pose| hand(label, SIM_SCORE, Vector2::new(x, y), SIM_SCALE, pose);
        let pinch_at = |label, point: Vector2<f64>| {
            hand(label, SIM_SCORE, wrist_for_pinch_point(point, SIM_SCALE), SIM_SCALE, SyntheticPose::Pinch)
        };

        match scene {
            Scene::Empty => Vec::new(),
            Scene::OpenHands => vec![
                at(HandLabel::Left, 0.3, 0.75, SyntheticPose::Open),
                at(HandLabel::Right, 0.7, 0.75, SyntheticPose::Open),
            ],
            Scene::PinchSpread => {
                let half = 0.08 + 0.14 * (progress * std::f64::consts::PI).sin();
                vec![
                    pinch_at(HandLabel::Left, Vector2::new(0.5 - half, 0.5)),
                    pinch_at(HandLabel::Right, Vector2::new(0.5 + half, 0.5)),
                ]
            }
            Scene::PinchDrift => {
                // Sweep left of center and upward: positive yaw and pitch.
                let center = Vector2::new(0.5 - 0.2 * (progress * std::f64::consts::PI).sin(), 0.5 - 0.12 * progress);
                vec![
                    pinch_at(HandLabel::Left, center - Vector2::new(0.1, 0.0)),
                    pinch_at(HandLabel::Right, center + Vector2::new(0.1, 0.0)),
                ]
            }
            Scene::SingleFist => vec![at(HandLabel::Right, 0.6, 0.75, SyntheticPose::Fist)],
            Scene::DoubleFist => vec![
                at(HandLabel::Left, 0.3, 0.75, SyntheticPose::Fist),
                at(HandLabel::Right, 0.7, 0.75, SyntheticPose::Fist),
            ],
            Scene::RightTaps | Scene::LeftTaps => {
                let label = if matches!(scene, Scene::RightTaps) { HandLabel::Right } else { HandLabel::Left };
                let x = if label == HandLabel::Right { 0.7 } else { 0.3 };
                // 0.2s pinch every 0.5s
                let pose = if local % 0.5 < 0.2 { SyntheticPose::Pinch } else { SyntheticPose::Open };
                vec![at(label, x, 0.75, pose)]
            }
        }
    }
}

impl HandSource for SimulatedSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let t = self.sim_time;
        let script_t = if self.repeat { t % Self::script_duration() } else { t };
        let Some((scene, local, duration)) = self.scene_at(script_t) else {
            return Ok(None);
        };
        self.sim_time += 1.0 / SIM_FPS;
        Ok(Some(Frame {
            t,
            hands: Self::hands_for(scene, local, duration),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::controller::GestureController;
    use std::io::Cursor;

    #[test]
    fn replay_reads_frames_and_skips_blank_lines() {
        let data = "{\"t\":0.0,\"hands\":[]}\n\n{\"t\":0.033}\n";
        let mut source = ReplaySource::from_reader(Cursor::new(data));
        assert_eq!(source.next_frame().unwrap().unwrap().t, 0.0);
        let second = source.next_frame().unwrap().unwrap();
        assert!(second.hands.is_empty());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn replay_reports_bad_line_number() {
        let data = "{\"t\":0.0}\nnot json\n{\"t\":0.1}\n";
        let mut source = ReplaySource::from_reader(Cursor::new(data));
        source.next_frame().unwrap();
        match source.next_frame() {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        // The reader moves past the bad line.
        assert_eq!(source.next_frame().unwrap().unwrap().t, 0.1);
    }

    #[test]
    fn missing_replay_file_errors() {
        assert!(matches!(
            ReplaySource::open("/nonexistent/replay.jsonl"),
            Err(SourceError::Open { .. })
        ));
    }

    #[test]
    fn simulation_ends_without_repeat() {
        let mut source = SimulatedSource::new(false);
        let mut frames: usize = 0;
        while source.next_frame().unwrap().is_some() {
            frames += 1;
        }
        let expected = (SimulatedSource::script_duration() * SIM_FPS).ceil() as usize;
        assert!(frames.abs_diff(expected) <= 1, "{frames} vs {expected}");
    }

    #[test]
    fn simulated_script_drives_every_control() {
        let mut source = SimulatedSource::new(false);
        let mut controller = GestureController::new(ControlConfig::default()).unwrap();
        let mut saw_zoom = false;
        let mut max_zoom: f64 = 0.0;
        while let Some(frame) = source.next_frame().unwrap() {
            let state = controller.update(&frame.hands, frame.t);
            saw_zoom |= state.zoom_line_active();
            max_zoom = max_zoom.max(state.zoom());
        }
        let state = controller.state();
        assert!(saw_zoom);
        assert!(max_zoom > 1.2);
        assert!(state.rotation_deg() != 0.0);
        assert!(state.camera_locked());
        assert!(state.paused());
        assert_eq!(state.inc_count, 4);
        assert_eq!(state.dec_count, 4);
    }
}
