// src/hand.rs
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HandLabel {
    Left,
    Right,
    #[default]
    Unknown,
}

impl HandLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandLabel::Left => "Left",
            HandLabel::Right => "Right",
            HandLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hand as reported by the pose estimator for a single frame.
///
/// Landmarks are normalized image coordinates (x right, y down).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    #[serde(default)]
    pub label: HandLabel,
    pub score: f64,
    #[serde(with = "landmark_serde")]
    pub landmarks: Vec<Vector3<f64>>,
}

impl HandObservation {
    pub fn new(label: HandLabel, score: f64, landmarks: Vec<Vector3<f64>>) -> Self {
        Self { label, score, landmarks }
    }
}

/// Identity of a hand across frames: its label plus its position among
/// same-label hands in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandKey {
    pub label: HandLabel,
    pub ordinal: usize,
}

/// Assigns `(label, ordinal)` keys in observation order.
pub fn assign_keys(hands: &[HandObservation]) -> Vec<HandKey> {
    let mut seen = [0usize; 3];
    hands
        .iter()
        .map(|hand| {
            let slot = match hand.label {
                HandLabel::Left => 0,
                HandLabel::Right => 1,
                HandLabel::Unknown => 2,
            };
            let key = HandKey { label: hand.label, ordinal: seen[slot] };
            seen[slot] += 1;
            key
        })
        .collect()
}

pub fn dist(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

// Replay files carry landmarks as plain [x, y, z] triples.
mod landmark_serde {
    use nalgebra::Vector3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Vector3<f64>], s: S) -> Result<S::Ok, S::Error> {
        let raw: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        raw.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vector3<f64>>, D::Error> {
        let raw: Vec<[f64; 3]> = Vec::deserialize(d)?;
        Ok(raw.into_iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(label: HandLabel) -> HandObservation {
        HandObservation::new(label, 0.9, vec![Vector3::zeros(); LANDMARK_COUNT])
    }

    #[test]
    fn keys_count_ordinals_per_label() {
        let hands = vec![obs(HandLabel::Right), obs(HandLabel::Left), obs(HandLabel::Right)];
        let keys = assign_keys(&hands);
        assert_eq!(keys[0], HandKey { label: HandLabel::Right, ordinal: 0 });
        assert_eq!(keys[1], HandKey { label: HandLabel::Left, ordinal: 0 });
        assert_eq!(keys[2], HandKey { label: HandLabel::Right, ordinal: 1 });
    }

    #[test]
    fn observation_parses_from_json() {
        let json = r#"{"label":"Left","score":0.8,"landmarks":[[0.1,0.2,0.0],[0.3,0.4,-0.1]]}"#;
        let hand: HandObservation = serde_json::from_str(json).unwrap();
        assert_eq!(hand.label, HandLabel::Left);
        assert_eq!(hand.landmarks.len(), 2);
        assert!((hand.landmarks[1].y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn missing_label_is_unknown() {
        let json = r#"{"score":0.5,"landmarks":[]}"#;
        let hand: HandObservation = serde_json::from_str(json).unwrap();
        assert_eq!(hand.label, HandLabel::Unknown);
    }
}
