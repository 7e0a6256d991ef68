// src/smoothing.rs
use crate::hand::HandKey;
use nalgebra::Vector3;
use std::collections::{HashMap, HashSet};

/// Exponential per-landmark filter, one history per hand key.
///
/// History is dropped the same frame a key goes missing; there is no grace
/// period.
pub struct LandmarkSmoother {
    alpha: f64,
    history: HashMap<HandKey, Vec<Vector3<f64>>>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            history: HashMap::new(),
        }
    }

    pub fn smooth(&mut self, key: HandKey, current: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        let alpha = self.alpha;
        let smoothed = match self.history.get(&key) {
            Some(prev) if prev.len() == current.len() => prev
                .iter()
                .zip(current)
                .map(|(s, c)| s * (1.0 - alpha) + c * alpha)
                .collect(),
            _ => current.to_vec(),
        };
        self.history.insert(key, smoothed.clone());
        smoothed
    }

    pub fn prune(&mut self, active: &HashSet<HandKey>) {
        self.history.retain(|key, _| active.contains(key));
    }

    pub fn tracked(&self) -> usize {
        self.history.len()
    }
}
