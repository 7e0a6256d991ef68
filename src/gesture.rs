// src/gesture.rs
use crate::config::ControlConfig;
use crate::hand::*;
use nalgebra::{Vector2, Vector3};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    TwoFingerPinch,
    Pinch,
    OpenHand,
    Point,
    Fist,
    None,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::TwoFingerPinch => "two_finger_pinch",
            Gesture::Pinch => "pinch",
            Gesture::OpenHand => "open_hand",
            Gesture::Point => "point",
            Gesture::Fist => "fist",
            Gesture::None => "none",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometric features of one smoothed hand.
#[derive(Debug, Clone)]
pub struct HandFeatures {
    pub palm_scale: f64,
    /// Thumb–index tip distance over palm scale.
    pub pinch_ratio: f64,
    /// Thumb–middle tip distance over palm scale.
    pub middle_pinch_ratio: f64,
    /// Index, middle, ring, pinky.
    pub extended: [bool; 4],
    pub max_tip_ratio: f64,
    /// Midpoint between thumb tip and index tip, image coordinates.
    pub pinch_point: Vector2<f64>,
    pub gesture: Gesture,
}

/// A classified hand ready for the control engines.
#[derive(Debug, Clone)]
pub struct TrackedHand {
    pub key: HandKey,
    pub label: HandLabel,
    pub score: f64,
    pub landmarks: Vec<Vector3<f64>>,
    pub features: HandFeatures,
}

impl TrackedHand {
    pub fn gesture(&self) -> Gesture {
        self.features.gesture
    }

    /// Thumb–index pinch below threshold; the criterion for zoom pairing and
    /// step counting.
    pub fn is_pinching(&self, config: &ControlConfig) -> bool {
        self.features.pinch_ratio < config.pinch_ratio
    }
}

pub fn palm_scale(landmarks: &[Vector3<f64>], floor: f64) -> f64 {
    let wrist = &landmarks[WRIST];
    let index = &landmarks[INDEX_MCP];
    let pinky = &landmarks[PINKY_MCP];
    let mean = (dist(wrist, index) + dist(wrist, pinky) + dist(index, pinky)) / 3.0;
    mean.max(floor)
}

pub fn finger_extended(landmarks: &[Vector3<f64>], tip: usize, pip: usize, palm: f64, margin: f64) -> bool {
    let wrist = &landmarks[WRIST];
    dist(&landmarks[tip], wrist) > dist(&landmarks[pip], wrist) + margin * palm
}

/// Computes features and the gesture for a full 21-point hand.
/// Returns `None` for partial hands.
pub fn analyze(landmarks: &[Vector3<f64>], config: &ControlConfig) -> Option<HandFeatures> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }

    let palm = palm_scale(landmarks, config.palm_scale_floor);
    let thumb = &landmarks[THUMB_TIP];
    let pinch_ratio = dist(thumb, &landmarks[INDEX_TIP]) / palm;
    let middle_pinch_ratio = dist(thumb, &landmarks[MIDDLE_TIP]) / palm;

    let fingers = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
    let mut extended = [false; 4];
    for (slot, &(tip, pip)) in fingers.iter().enumerate() {
        extended[slot] = finger_extended(landmarks, tip, pip, palm, config.finger_extend_margin);
    }

    let wrist = &landmarks[WRIST];
    let max_tip_ratio = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP]
        .iter()
        .map(|&tip| dist(&landmarks[tip], wrist))
        .fold(0.0_f64, f64::max)
        / palm;

    let mid = (thumb + landmarks[INDEX_TIP]) * 0.5;

    let mut features = HandFeatures {
        palm_scale: palm,
        pinch_ratio,
        middle_pinch_ratio,
        extended,
        max_tip_ratio,
        pinch_point: Vector2::new(mid.x, mid.y),
        gesture: Gesture::None,
    };
    features.gesture = classify(&features, config);
    Some(features)
}

/// First match wins. Pinches are checked before the finger-extension poses
/// since a pinching hand can also read as a fist or as nothing.
pub fn classify(f: &HandFeatures, config: &ControlConfig) -> Gesture {
    let [index, middle, ring, pinky] = f.extended;

    if f.pinch_ratio < config.two_finger_pinch_ratio && f.middle_pinch_ratio < config.two_finger_pinch_ratio {
        Gesture::TwoFingerPinch
    } else if f.pinch_ratio < config.pinch_ratio {
        Gesture::Pinch
    } else if index && middle && ring && pinky {
        Gesture::OpenHand
    } else if index && !middle && !ring && !pinky {
        Gesture::Point
    } else if !index && !middle && !ring && !pinky && f.max_tip_ratio < config.fist_max_tip_ratio {
        Gesture::Fist
    } else {
        Gesture::None
    }
}
