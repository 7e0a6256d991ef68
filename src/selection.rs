// src/selection.rs
use crate::gesture::TrackedHand;
use crate::hand::HandLabel;
use std::cmp::Ordering;

fn by_score(a: &&TrackedHand, b: &&TrackedHand) -> Ordering {
    a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
}

/// Highest-score Right hand, otherwise the highest-score hand overall.
pub fn select_control_hand(candidates: &[TrackedHand]) -> Option<&TrackedHand> {
    best_hand_by_label(candidates, HandLabel::Right).or_else(|| candidates.iter().max_by(by_score))
}

pub fn best_hand_by_label(candidates: &[TrackedHand], label: HandLabel) -> Option<&TrackedHand> {
    candidates.iter().filter(|h| h.label == label).max_by(by_score)
}

/// The two highest-score hands among `candidates`, best first.
pub fn top_two<'a, I>(candidates: I) -> Option<(&'a TrackedHand, &'a TrackedHand)>
where
    I: IntoIterator<Item = &'a TrackedHand>,
{
    let mut ranked: Vec<&TrackedHand> = candidates.into_iter().collect();
    if ranked.len() < 2 {
        return None;
    }
    ranked.sort_by(|a, b| by_score(b, a));
    Some((ranked[0], ranked[1]))
}
