// src/synthetic.rs - Synthetic 21-point hands for simulation mode and tests
use crate::hand::*;
use nalgebra::{Vector2, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticPose {
    Open,
    Point,
    Fist,
    Pinch,
    TwoFingerPinch,
}

/// Palm scale of a synthetic hand built with `scale = 1.0`.
pub const UNIT_PALM_SCALE: f64 = 0.8349;

/// Offset of the thumb/index pinch midpoint from the wrist, per unit scale.
pub const PINCH_POINT_OFFSET: (f64, f64) = (-0.58, -1.18);

const FINGER_BASES: [(usize, (f64, f64)); 4] = [
    (INDEX_MCP, (-0.35, -0.9)),
    (MIDDLE_MCP, (-0.1, -0.95)),
    (RING_MCP, (0.12, -0.9)),
    (PINKY_MCP, (0.32, -0.8)),
];

/// Builds landmarks for `pose` with the wrist at `wrist` (normalized image
/// coordinates) and a hand size of `scale`.
pub fn hand_landmarks(wrist: Vector2<f64>, scale: f64, pose: SyntheticPose) -> Vec<Vector3<f64>> {
    let mut local = [(0.0, 0.0); LANDMARK_COUNT];
    local[THUMB_CMC] = (-0.35, -0.25);
    local[THUMB_CMC + 1] = (-0.55, -0.4);
    local[THUMB_CMC + 2] = (-0.7, -0.5);

    let extended = match pose {
        SyntheticPose::Open => [true, true, true, true],
        SyntheticPose::Point => [true, false, false, false],
        SyntheticPose::Fist => [false, false, false, false],
        SyntheticPose::Pinch | SyntheticPose::TwoFingerPinch => [false, true, true, true],
    };

    for (finger, &(mcp, (bx, by))) in FINGER_BASES.iter().enumerate() {
        local[mcp] = (bx, by);
        if extended[finger] {
            local[mcp + 1] = (bx, by - 0.35);
            local[mcp + 2] = (bx, by - 0.6);
            local[mcp + 3] = (bx, by - 0.85);
        } else {
            local[mcp + 1] = (bx, by - 0.3);
            local[mcp + 2] = (bx, by - 0.1);
            local[mcp + 3] = (bx * 0.75, by * 0.75);
        }
    }

    local[THUMB_TIP] = match pose {
        SyntheticPose::Open => (-0.85, -0.6),
        SyntheticPose::Point | SyntheticPose::Fist => (-0.55, -0.45),
        SyntheticPose::Pinch => (-0.56, -1.16),
        SyntheticPose::TwoFingerPinch => (-0.53, -1.17),
    };

    if matches!(pose, SyntheticPose::Pinch | SyntheticPose::TwoFingerPinch) {
        local[INDEX_PIP] = (-0.45, -1.2);
        local[INDEX_PIP + 1] = (-0.55, -1.22);
        local[INDEX_TIP] = (-0.6, -1.2);
    }
    if pose == SyntheticPose::TwoFingerPinch {
        local[MIDDLE_PIP] = (-0.2, -1.25);
        local[MIDDLE_PIP + 1] = (-0.35, -1.3);
        local[MIDDLE_TIP] = (-0.45, -1.25);
    }

    local
        .iter()
        .map(|&(x, y)| Vector3::new(wrist.x + x * scale, wrist.y + y * scale, 0.0))
        .collect()
}

pub fn hand(label: HandLabel, score: f64, wrist: Vector2<f64>, scale: f64, pose: SyntheticPose) -> HandObservation {
    HandObservation::new(label, score, hand_landmarks(wrist, scale, pose))
}

/// Wrist position that puts a hand's pinch point at `point`.
pub fn wrist_for_pinch_point(point: Vector2<f64>, scale: f64) -> Vector2<f64> {
    Vector2::new(
        point.x - PINCH_POINT_OFFSET.0 * scale,
        point.y - PINCH_POINT_OFFSET.1 * scale,
    )
}
