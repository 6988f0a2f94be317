//! Field-relative scoring.
//!
//! Expresses each horse's base score against the rest of its own race.
//! Everything here is advisory: the classifier attaches it to horses but
//! never feeds it back into the tier decision.

use serde::{Deserialize, Serialize};

/// Minimum active runners before a field context is computed
pub const MIN_FIELD_SIZE: usize = 2;

/// z-score beyond which a tier nudge is suggested
pub const Z_NUDGE: f64 = 1.5;

/// Distribution of base scores across the active field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContext {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldContext {
    /// Returns `None` when fewer than `MIN_FIELD_SIZE` scores are given.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.len() < MIN_FIELD_SIZE {
            return None;
        }

        let count = scores.len();
        let mean = scores.iter().sum::<f64>() / count as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    pub fn z_score(&self, score: f64) -> f64 {
        if self.std_dev > 0.0 {
            (score - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// A horse's standing within its own field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRelativeScore {
    /// Sole leader, clear of the next horse by at least the standout gap
    pub is_standout: bool,
    /// Points ahead of the next horse at or below this one
    pub gap_from_next_best: f64,
    pub z_score: f64,
    /// Suggested tier nudge (-1, 0, +1). Never applied.
    pub tier_adjustment: i8,
}

/// Compare `score` with the other horses in `field_scores`.
///
/// `own_index` is the position of this horse in `field_scores`, so that a
/// horse tied with itself is not counted as a rival.
pub fn field_relative_score(
    own_index: usize,
    field_scores: &[f64],
    context: &FieldContext,
    standout_gap: f64,
) -> FieldRelativeScore {
    let score = field_scores.get(own_index).copied().unwrap_or(0.0);

    let others = field_scores
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != own_index)
        .map(|(_, s)| *s);

    let mut is_leader = true;
    let mut next_best: Option<f64> = None;
    for other in others {
        if other >= score {
            is_leader = false;
        }
        if other <= score {
            next_best = Some(next_best.map_or(other, |n: f64| n.max(other)));
        }
    }

    let gap_from_next_best = next_best.map_or(0.0, |n| score - n);
    let is_standout = is_leader && next_best.is_some() && gap_from_next_best >= standout_gap;
    let z_score = context.z_score(score);

    let tier_adjustment = if is_standout || z_score >= Z_NUDGE {
        1
    } else if z_score <= -Z_NUDGE {
        -1
    } else {
        0
    };

    FieldRelativeScore {
        is_standout,
        gap_from_next_best,
        z_score,
        tier_adjustment,
    }
}
