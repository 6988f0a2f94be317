//! Overlay analysis: model win probability against the market price.
//!
//! The analyzer is a collaborator of the classifier. `FieldShareAnalyzer`
//! is the deterministic default; callers may plug in their own model through
//! the `OverlayAnalyzer` trait.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::error::AnalysisError;
use crate::odds::{fair_odds, format_odds, implied_probability};
use crate::types::ProgramNumber;

/// Overlay needed for the undervalued special case
pub const UNDERVALUED_MIN_OVERLAY: f64 = 150.0;

/// Base score floor for the undervalued special case
pub const UNDERVALUED_MIN_BASE: f64 = 100.0;

/// Overlay at or below which a tier1-calibre horse is a trap
pub const TRAP_MAX_OVERLAY: f64 = -25.0;

/// Market verdict on a horse's price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayRecommendation {
    StrongBet,
    Bet,
    Fair,
    Pass,
    Avoid,
}

impl OverlayRecommendation {
    pub fn from_overlay(overlay_percent: f64) -> Self {
        if overlay_percent >= 50.0 {
            OverlayRecommendation::StrongBet
        } else if overlay_percent >= 15.0 {
            OverlayRecommendation::Bet
        } else if overlay_percent >= -10.0 {
            OverlayRecommendation::Fair
        } else if overlay_percent >= -25.0 {
            OverlayRecommendation::Pass
        } else {
            OverlayRecommendation::Avoid
        }
    }
}

/// Result of comparing the model's price with the market's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayAnalysis {
    /// Positive when the market pays more than the fair price
    pub overlay_percent: f64,
    pub expected_win_percent: f64,
    pub implied_win_percent: f64,
    pub fair_odds: String,
    pub recommendation: OverlayRecommendation,
    pub is_positive_ev: bool,
    pub ev_per_dollar: f64,
}

impl OverlayAnalysis {
    /// Analysis of a horse priced exactly at its fair odds.
    pub fn neutral(odds: f64) -> Self {
        let implied = implied_probability(odds) * 100.0;
        Self {
            overlay_percent: 0.0,
            expected_win_percent: implied,
            implied_win_percent: implied,
            fair_odds: format_odds(odds),
            recommendation: OverlayRecommendation::Fair,
            is_positive_ev: false,
            ev_per_dollar: 0.0,
        }
    }
}

/// Over- or under-valuation pattern that overrides the score bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpecialCase {
    /// Modest score, big overlay: forced into tier2
    Undervalued { overlay_percent: f64 },
    /// Tier1 score the market overrates: demoted to tier2
    Trap { overlay_percent: f64 },
}

impl SpecialCase {
    pub fn label(&self) -> &'static str {
        match self {
            SpecialCase::Undervalued { .. } => "hidden value",
            SpecialCase::Trap { .. } => "false favorite",
        }
    }
}

/// Bonus or penalty applied to the base score from the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAdjustment {
    pub adjusted_score: f64,
    pub adjustment: f64,
    pub special_case: Option<SpecialCase>,
    pub reasoning: String,
}

/// Overlay collaborator used by the classifier
pub trait OverlayAnalyzer {
    /// Compare the model price for `base_score` within `field_scores` with `odds`.
    fn analyze(
        &self,
        program: ProgramNumber,
        base_score: f64,
        field_scores: &[f64],
        odds: f64,
    ) -> Result<OverlayAnalysis, AnalysisError>;

    /// Turn an overlay into a score adjustment and special-case flag.
    fn adjust(&self, base_score: f64, overlay_percent: f64, scoring: &ScoringConfig) -> TierAdjustment {
        calculate_tier_adjustment(base_score, overlay_percent, scoring)
    }
}

/// Points added for an overlay (negative for underlays).
pub fn overlay_bonus(overlay_percent: f64) -> f64 {
    if !overlay_percent.is_finite() {
        0.0
    } else if overlay_percent >= 150.0 {
        15.0
    } else if overlay_percent >= 80.0 {
        10.0
    } else if overlay_percent >= 40.0 {
        5.0
    } else if overlay_percent >= 10.0 {
        2.0
    } else if overlay_percent > -10.0 {
        0.0
    } else if overlay_percent > -25.0 {
        -5.0
    } else {
        -10.0
    }
}

/// Default tier adjustment shared by every analyzer.
pub fn calculate_tier_adjustment(
    base_score: f64,
    overlay_percent: f64,
    scoring: &ScoringConfig,
) -> TierAdjustment {
    let adjustment = overlay_bonus(overlay_percent);
    let adjusted_score = (base_score + adjustment).max(0.0);

    let special_case = if overlay_percent >= UNDERVALUED_MIN_OVERLAY
        && base_score >= UNDERVALUED_MIN_BASE
        && base_score < scoring.tier2_min
    {
        Some(SpecialCase::Undervalued { overlay_percent })
    } else if overlay_percent <= TRAP_MAX_OVERLAY && base_score >= scoring.tier1_min {
        Some(SpecialCase::Trap { overlay_percent })
    } else {
        None
    };

    let reasoning = match special_case {
        Some(SpecialCase::Undervalued { .. }) => format!(
            "Hidden value: {:.0} base with a {:+.0}% overlay, promoted to value tier",
            base_score, overlay_percent
        ),
        Some(SpecialCase::Trap { .. }) => format!(
            "False favorite: {:.0} base but the market is {:.0}% too short",
            base_score,
            overlay_percent.abs()
        ),
        None if adjustment > 0.0 => {
            format!("{:+.0}% overlay adds {:.0} points", overlay_percent, adjustment)
        }
        None if adjustment < 0.0 => {
            format!("{:+.0}% underlay costs {:.0} points", overlay_percent, adjustment.abs())
        }
        None => "Fairly priced, no adjustment".to_string(),
    };

    TierAdjustment {
        adjusted_score,
        adjustment,
        special_case,
        reasoning,
    }
}

/// Default analyzer: a horse's win chance is its share of `score^exponent`
/// across the active field.
#[derive(Debug, Clone)]
pub struct FieldShareAnalyzer {
    pub exponent: i32,
    /// Expected win probability bounds, in percent
    pub min_win_percent: f64,
    pub max_win_percent: f64,
}

impl Default for FieldShareAnalyzer {
    fn default() -> Self {
        Self {
            exponent: 4,
            min_win_percent: 0.5,
            max_win_percent: 95.0,
        }
    }
}

impl FieldShareAnalyzer {
    /// Expected win percent for `score` among `field_scores`.
    pub fn win_percent(&self, score: f64, field_scores: &[f64]) -> f64 {
        let weight = |s: f64| s.max(0.0).powi(self.exponent);
        let total: f64 = field_scores.iter().copied().map(weight).sum();

        let share = if total > 0.0 {
            weight(score) / total * 100.0
        } else if field_scores.is_empty() {
            100.0
        } else {
            100.0 / field_scores.len() as f64
        };

        share.clamp(self.min_win_percent, self.max_win_percent)
    }
}

impl OverlayAnalyzer for FieldShareAnalyzer {
    fn analyze(
        &self,
        _program: ProgramNumber,
        base_score: f64,
        field_scores: &[f64],
        odds: f64,
    ) -> Result<OverlayAnalysis, AnalysisError> {
        let expected = self.win_percent(base_score, field_scores);
        let implied = implied_probability(odds) * 100.0;

        let overlay_percent = if implied > 0.0 {
            (expected / implied - 1.0) * 100.0
        } else {
            0.0
        };

        let ev_per_dollar = expected / 100.0 * (odds + 1.0) - 1.0;

        Ok(OverlayAnalysis {
            overlay_percent,
            expected_win_percent: expected,
            implied_win_percent: implied,
            fair_odds: format_odds(fair_odds(expected / 100.0)),
            recommendation: OverlayRecommendation::from_overlay(overlay_percent),
            is_positive_ev: ev_per_dollar > 0.0,
            ev_per_dollar,
        })
    }
}
