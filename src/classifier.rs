//! Tier classification.
//!
//! Turns a field of scored horses into betting tiers:
//! - tier1: chalk, high adjusted score and confidence
//! - tier2: value alternatives, including hidden-value and false-favorite cases
//! - tier3: longshots that clear a minimum overlay
//!
//! Horses are rebuilt from scratch on every pass; nothing here mutates input.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::config::{FeatureConfig, ScoringConfig};
use crate::error::AnalysisError;
use crate::field::{field_relative_score, FieldContext, FieldRelativeScore};
use crate::odds::{format_odds, parse_odds};
use crate::overlay::{OverlayAnalysis, OverlayAnalyzer, SpecialCase, TierAdjustment};
use crate::types::{FieldInput, HorseScore, ProgramNumber, Tier};

/// Confidence floor of the rescaled base score
const CONFIDENCE_FLOOR: f64 = 40.0;

/// Confidence range above the floor
const CONFIDENCE_SPAN: f64 = 60.0;

/// Odds-confidence nudge size when the toggle is on
const ODDS_CONFIDENCE_NUDGE: i32 = 5;

/// One active horse after overlay analysis, before tiering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseAnalysis {
    pub program_number: ProgramNumber,
    pub name: String,
    pub index: usize,
    pub score: HorseScore,
    pub confidence: u8,
    pub odds: f64,
    pub odds_display: String,
    pub overlay: OverlayAnalysis,
    pub adjustment: TierAdjustment,
}

impl HorseAnalysis {
    pub fn adjusted_score(&self) -> f64 {
        self.adjustment.adjusted_score
    }
}

/// A horse assigned to a betting tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedHorse {
    pub program_number: ProgramNumber,
    pub name: String,
    pub index: usize,
    pub score: HorseScore,
    pub confidence: u8,
    pub odds: f64,
    pub odds_display: String,
    pub tier: Tier,
    pub adjusted_score: f64,
    pub overlay: OverlayAnalysis,
    pub special_case: Option<SpecialCase>,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_relative: Option<FieldRelativeScore>,
}

impl ClassifiedHorse {
    fn from_analysis(analysis: &HorseAnalysis, tier: Tier, field_relative: Option<FieldRelativeScore>) -> Self {
        Self {
            program_number: analysis.program_number,
            name: analysis.name.clone(),
            index: analysis.index,
            score: analysis.score.clone(),
            confidence: analysis.confidence,
            odds: analysis.odds,
            odds_display: analysis.odds_display.clone(),
            tier,
            adjusted_score: analysis.adjustment.adjusted_score,
            overlay: analysis.overlay.clone(),
            special_case: analysis.adjustment.special_case,
            reasoning: analysis.adjustment.reasoning.clone(),
            field_relative,
        }
    }

    pub fn base_score(&self) -> f64 {
        self.score.base()
    }

    pub fn overlay_percent(&self) -> f64 {
        self.overlay.overlay_percent
    }

    pub fn is_special_case(&self) -> bool {
        self.special_case.is_some()
    }
}

/// Historical hit rates for a tier, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRates {
    pub win: f64,
    pub place: f64,
    pub show: f64,
}

/// Horses of one tier with display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierGroup {
    pub tier: Tier,
    pub name: String,
    pub description: String,
    pub horses: Vec<ClassifiedHorse>,
    pub expected_hit_rate: HitRates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_context: Option<FieldContext>,
}

impl TierGroup {
    fn new(tier: Tier, horses: Vec<ClassifiedHorse>, field_context: Option<FieldContext>) -> Self {
        let (name, description, expected_hit_rate) = tier_metadata(tier);
        Self {
            tier,
            name: name.to_string(),
            description: description.to_string(),
            horses,
            expected_hit_rate,
            field_context,
        }
    }

    pub fn top(&self) -> Option<&ClassifiedHorse> {
        self.horses.first()
    }
}

/// Static name, description and hit rates for a tier.
pub fn tier_metadata(tier: Tier) -> (&'static str, &'static str, HitRates) {
    match tier {
        Tier::Tier1 => (
            "Top Contenders",
            "Highest adjusted scores with strong confidence; the horses most likely to win",
            HitRates { win: 35.0, place: 55.0, show: 70.0 },
        ),
        Tier::Tier2 => (
            "Value Alternatives",
            "Competitive horses whose price offers value, plus over- and under-valued special cases",
            HitRates { win: 18.0, place: 35.0, show: 50.0 },
        ),
        Tier::Tier3 => (
            "Longshot Value",
            "Lower-rated horses with a significant overlay; small stakes, big payouts",
            HitRates { win: 8.0, place: 18.0, show: 28.0 },
        ),
    }
}

/// Rescale a base score onto 40-100, optionally nudged by the market price.
pub fn calculate_confidence(
    base_score: f64,
    odds: f64,
    scoring: &ScoringConfig,
    features: &FeatureConfig,
) -> u8 {
    let ratio = if scoring.max_base_score > 0.0 {
        base_score.max(0.0) / scoring.max_base_score
    } else {
        0.0
    };
    let mut confidence = (CONFIDENCE_FLOOR + ratio * CONFIDENCE_SPAN).round().min(100.0) as i32;

    if features.odds_confidence_enabled {
        if odds <= 2.0 {
            confidence += ODDS_CONFIDENCE_NUDGE;
        } else if odds >= 15.0 {
            confidence -= ODDS_CONFIDENCE_NUDGE;
        }
    }

    confidence.clamp(0, 100) as u8
}

/// Deterministic, precedence-ordered tier decision.
///
/// Returns `None` when the horse falls below every band.
pub fn decide_tier(
    adjusted_score: f64,
    base_score: f64,
    confidence: u8,
    overlay_percent: f64,
    special_case: Option<SpecialCase>,
    scoring: &ScoringConfig,
) -> Option<Tier> {
    match special_case {
        Some(SpecialCase::Undervalued { .. }) => return Some(Tier::Tier2),
        Some(SpecialCase::Trap { .. }) if base_score >= scoring.tier1_min => return Some(Tier::Tier2),
        _ => {}
    }

    if adjusted_score >= scoring.tier1_min && confidence >= scoring.tier1_min_confidence {
        return Some(Tier::Tier1);
    }

    if adjusted_score >= scoring.tier2_min && adjusted_score <= scoring.tier2_max + scoring.band_tolerance {
        return Some(Tier::Tier2);
    }

    if adjusted_score >= scoring.tier3_min && adjusted_score <= scoring.tier3_max + scoring.band_tolerance {
        if overlay_percent >= scoring.tier3_min_overlay {
            return Some(Tier::Tier3);
        }
        return None;
    }

    None
}

fn compare_tier1(a: &ClassifiedHorse, b: &ClassifiedHorse) -> Ordering {
    b.adjusted_score
        .total_cmp(&a.adjusted_score)
        .then_with(|| b.overlay_percent().total_cmp(&a.overlay_percent()))
        .then_with(|| a.program_number.cmp(&b.program_number))
}

fn compare_tier2(a: &ClassifiedHorse, b: &ClassifiedHorse) -> Ordering {
    b.is_special_case()
        .cmp(&a.is_special_case())
        .then_with(|| b.overlay_percent().total_cmp(&a.overlay_percent()))
        .then_with(|| a.program_number.cmp(&b.program_number))
}

fn compare_tier3(a: &ClassifiedHorse, b: &ClassifiedHorse) -> Ordering {
    b.overlay_percent()
        .total_cmp(&a.overlay_percent())
        .then_with(|| b.odds.total_cmp(&a.odds))
        .then_with(|| a.program_number.cmp(&b.program_number))
}

/// Classifier bound to an overlay analyzer and its configuration
pub struct TierClassifier<'a> {
    analyzer: &'a dyn OverlayAnalyzer,
    scoring: &'a ScoringConfig,
    features: &'a FeatureConfig,
}

impl<'a> TierClassifier<'a> {
    pub fn new(
        analyzer: &'a dyn OverlayAnalyzer,
        scoring: &'a ScoringConfig,
        features: &'a FeatureConfig,
    ) -> Self {
        Self {
            analyzer,
            scoring,
            features,
        }
    }

    /// Run overlay analysis for every active horse. Scratches are dropped first.
    pub fn analyze_field(&self, field: &[FieldInput<'_>]) -> Result<Vec<HorseAnalysis>, AnalysisError> {
        let active: Vec<&FieldInput<'_>> = field
            .iter()
            .filter(|input| !input.score.is_scratched && !input.horse.scratched)
            .collect();

        let field_scores: Vec<f64> = active.iter().map(|input| input.score.base()).collect();

        let mut analyses = Vec::with_capacity(active.len());
        for input in active {
            let base = input.score.base();
            let odds = parse_odds(&input.horse.odds, self.scoring.fallback_odds);
            let confidence = calculate_confidence(base, odds, self.scoring, self.features);

            let overlay = self
                .analyzer
                .analyze(input.horse.program_number, base, &field_scores, odds)?;
            let adjustment = self.analyzer.adjust(base, overlay.overlay_percent, self.scoring);

            analyses.push(HorseAnalysis {
                program_number: input.horse.program_number,
                name: input.horse.name.clone(),
                index: input.index,
                score: input.score.clone(),
                confidence,
                odds,
                odds_display: format_odds(odds),
                overlay,
                adjustment,
            });
        }

        Ok(analyses)
    }

    /// Analyze and classify a field.
    pub fn classify(&self, field: &[FieldInput<'_>]) -> Result<Vec<TierGroup>, AnalysisError> {
        let analyses = self.analyze_field(field)?;
        Ok(classify_analyzed(&analyses, self.scoring, self.features))
    }
}

/// Classify a field with the given analyzer.
pub fn classify_horses(
    field: &[FieldInput<'_>],
    analyzer: &dyn OverlayAnalyzer,
    scoring: &ScoringConfig,
    features: &FeatureConfig,
) -> Result<Vec<TierGroup>, AnalysisError> {
    TierClassifier::new(analyzer, scoring, features).classify(field)
}

/// Tier already-analyzed horses into sorted, non-empty groups.
pub fn classify_analyzed(
    analyses: &[HorseAnalysis],
    scoring: &ScoringConfig,
    features: &FeatureConfig,
) -> Vec<TierGroup> {
    let field_scores: Vec<f64> = analyses.iter().map(|a| a.score.base()).collect();
    let field_context = FieldContext::from_scores(&field_scores);

    let mut buckets: [Vec<ClassifiedHorse>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (i, analysis) in analyses.iter().enumerate() {
        let tier = decide_tier(
            analysis.adjusted_score(),
            analysis.score.base(),
            analysis.confidence,
            analysis.overlay.overlay_percent,
            analysis.adjustment.special_case,
            scoring,
        );

        let Some(tier) = tier else {
            debug!(
                "#{} {} excluded: adjusted {:.1}, overlay {:+.1}%",
                analysis.program_number,
                analysis.name,
                analysis.adjusted_score(),
                analysis.overlay.overlay_percent
            );
            continue;
        };

        let field_relative = match (&field_context, features.field_relative_enabled) {
            (Some(ctx), true) => Some(field_relative_score(i, &field_scores, ctx, features.standout_gap)),
            _ => None,
        };

        debug!(
            "#{} {} -> {} (adjusted {:.1}, confidence {})",
            analysis.program_number,
            analysis.name,
            tier,
            analysis.adjusted_score(),
            analysis.confidence
        );

        buckets[tier.index()].push(ClassifiedHorse::from_analysis(analysis, tier, field_relative));
    }

    let [mut tier1, mut tier2, mut tier3] = buckets;
    tier1.sort_by(compare_tier1);
    tier2.sort_by(compare_tier2);
    tier3.sort_by(compare_tier3);

    [(Tier::Tier1, tier1), (Tier::Tier2, tier2), (Tier::Tier3, tier3)]
        .into_iter()
        .filter(|(_, horses)| !horses.is_empty())
        .map(|(tier, horses)| TierGroup::new(tier, horses, field_context.clone()))
        .collect()
}
