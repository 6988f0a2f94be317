//! Bet generation.
//!
//! Turns tier groups plus detector output into a sized, deduplicated and
//! explained set of wagers. Generation itself is pure; the only fallible
//! step is running the detectors, which happens in [`BetGenerator`].

mod explain;
mod postprocess;
mod special;
mod tier1;
mod tier2;
mod tier3;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::betting::{hit_probability, BetHorse, BetSection, BetType, GeneratedBet, PotentialReturn};
use crate::classifier::{ClassifiedHorse, HorseAnalysis, TierGroup};
use crate::config::{AppConfig, BankrollConfig, BettingConfig, ComplexityMode, FeatureConfig};
use crate::detectors::{HiddenValue, HiddenValueDetector, LongshotAnalysis, LongshotDetector};
use crate::error::{AnalysisError, RecommendationError};
use crate::harville::{normalize_win_probs, WinProbs};
use crate::sizing::calculate_bet_amount;
use crate::types::{ProgramNumber, RaceInfo, Tier};
use crate::window::format_currency;

pub use postprocess::{dedup_bets, mark_recommended, sanitize_bets};

/// Bets generated for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBets {
    pub tier: Tier,
    pub name: String,
    pub bets: Vec<GeneratedBet>,
    pub total_cost: f64,
}

/// Bets outside the tier structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialBets {
    pub nuclear: Vec<GeneratedBet>,
    pub hidden_value: Vec<GeneratedBet>,
    pub high_ev: Vec<GeneratedBet>,
}

impl SpecialBets {
    pub fn is_empty(&self) -> bool {
        self.nuclear.is_empty() && self.hidden_value.is_empty() && self.high_ev.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedBet> {
        self.nuclear.iter().chain(&self.hidden_value).chain(&self.high_ev)
    }
}

/// Full recommendation set for a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecommendations {
    pub race_number: u32,
    pub tier_bets: Vec<TierBets>,
    pub special_bets: SpecialBets,
    pub total_cost: f64,
    /// Smallest single winning ticket to every ticket cashing
    pub potential_return: PotentialReturn,
    pub recommended_count: usize,
    pub summary: String,
}

impl BetRecommendations {
    /// Structurally valid result with no bets.
    pub fn empty(race_number: u32) -> Self {
        Self {
            race_number,
            tier_bets: Vec::new(),
            special_bets: SpecialBets::default(),
            total_cost: 0.0,
            potential_return: PotentialReturn::default(),
            recommended_count: 0,
            summary: format!("Race {}: no bets recommended", race_number),
        }
    }

    /// Every bet, tier bets first.
    pub fn all_bets(&self) -> impl Iterator<Item = &GeneratedBet> {
        self.tier_bets
            .iter()
            .flat_map(|t| t.bets.iter())
            .chain(self.special_bets.iter())
    }

    pub fn bet_count(&self) -> usize {
        self.all_bets().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bet_count() == 0
    }
}

/// Detector output consumed by generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialAnalyses {
    pub longshots: Vec<LongshotAnalysis>,
    pub hidden_values: Vec<HiddenValue>,
}

impl SpecialAnalyses {
    pub fn longshot(&self, program: ProgramNumber) -> Option<&LongshotAnalysis> {
        self.longshots
            .iter()
            .find(|l| l.program_number == program && l.is_qualifying())
    }
}

/// Inputs shared by every generation rule
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub race: &'a RaceInfo,
    /// Every active horse, classified or not
    pub field: &'a [HorseAnalysis],
    pub bankroll: &'a BankrollConfig,
    pub betting: &'a BettingConfig,
    pub features: &'a FeatureConfig,
}

impl<'a> GenerationContext<'a> {
    pub fn new(race: &'a RaceInfo, field: &'a [HorseAnalysis], config: &'a AppConfig) -> Self {
        Self {
            race,
            field,
            bankroll: &config.bankroll,
            betting: &config.betting,
            features: &config.features,
        }
    }

    pub fn active_runners(&self) -> usize {
        self.field.len()
    }
}

/// Whether the complexity mode shows a bet type.
pub fn complexity_allows(mode: ComplexityMode, bet_type: BetType) -> bool {
    match mode {
        ComplexityMode::Simple => bet_type.is_straight(),
        ComplexityMode::Moderate => {
            bet_type.is_straight()
                || matches!(
                    bet_type,
                    BetType::ExactaBox | BetType::ExactaKeyOver | BetType::ExactaKeyUnder | BetType::Quinella
                )
        }
        ComplexityMode::Advanced => true,
    }
}

/// Classified horses by tier
pub(crate) struct TierView<'a> {
    pub tier1: &'a [ClassifiedHorse],
    pub tier2: &'a [ClassifiedHorse],
    pub tier3: &'a [ClassifiedHorse],
}

impl<'a> TierView<'a> {
    fn new(groups: &'a [TierGroup]) -> Self {
        let horses = |tier: Tier| -> &'a [ClassifiedHorse] {
            groups
                .iter()
                .find(|g| g.tier == tier)
                .map(|g| g.horses.as_slice())
                .unwrap_or(&[])
        };
        Self {
            tier1: horses(Tier::Tier1),
            tier2: horses(Tier::Tier2),
            tier3: horses(Tier::Tier3),
        }
    }

    /// Every classified horse by adjusted score, best first
    pub fn contenders(&self) -> Vec<&'a ClassifiedHorse> {
        let mut all: Vec<&ClassifiedHorse> = self.tier1.iter().chain(self.tier2).chain(self.tier3).collect();
        all.sort_by(|a, b| {
            b.adjusted_score
                .total_cmp(&a.adjusted_score)
                .then_with(|| a.program_number.cmp(&b.program_number))
        });
        all
    }

    /// Best classified horses other than `exclude`, up to `limit`
    pub fn best_excluding(&self, exclude: &[ProgramNumber], limit: usize) -> Vec<&'a ClassifiedHorse> {
        self.contenders()
            .into_iter()
            .filter(|h| !exclude.contains(&h.program_number))
            .take(limit)
            .collect()
    }

    pub fn tier_of(&self, program: ProgramNumber) -> Option<Tier> {
        self.tier1
            .iter()
            .chain(self.tier2)
            .chain(self.tier3)
            .find(|h| h.program_number == program)
            .map(|h| h.tier)
    }
}

/// Collects candidate bets, dropping those the mode or field can't support
pub(crate) struct BetSlate<'a> {
    pub ctx: GenerationContext<'a>,
    win_probs: WinProbs,
    bets: Vec<GeneratedBet>,
}

impl<'a> BetSlate<'a> {
    fn new(ctx: GenerationContext<'a>) -> Self {
        let win_probs = normalize_win_probs(
            ctx.field
                .iter()
                .map(|h| (h.program_number, h.overlay.expected_win_percent)),
        );
        Self {
            ctx,
            win_probs,
            bets: Vec::new(),
        }
    }

    /// Per-combination stake for a horse at `tier`
    pub fn unit(&self, confidence: u8, tier: Tier) -> f64 {
        calculate_bet_amount(confidence, tier, self.ctx.bankroll)
    }

    /// Per-combination stake for exotics: half the straight unit, at least the minimum bet
    pub fn exotic_unit(&self, confidence: u8, tier: Tier) -> f64 {
        (self.unit(confidence, tier) / 2.0).round().max(self.ctx.bankroll.min_bet)
    }

    pub fn add(&mut self, mut bet: GeneratedBet) {
        if !complexity_allows(self.ctx.bankroll.complexity_mode, bet.bet_type) {
            debug!("{} skipped by complexity mode", bet.bet_type.label());
            return;
        }
        if bet.horses.len() < bet.bet_type.min_horses() {
            debug!(
                "{} skipped: {} horse(s), needs {}",
                bet.bet_type.label(),
                bet.horses.len(),
                bet.bet_type.min_horses()
            );
            return;
        }

        bet.hit_probability = hit_probability(bet.bet_type, &bet.program_numbers(), &self.win_probs);
        self.bets.push(bet);
    }

    pub fn covers(&self, bet_type: BetType, program: ProgramNumber) -> bool {
        self.bets
            .iter()
            .any(|b| b.bet_type == bet_type && b.horses.first().map(|h| h.program_number) == Some(program))
    }

    fn into_bets(self) -> Vec<GeneratedBet> {
        self.bets
    }
}

pub(crate) fn snapshot(horses: &[&ClassifiedHorse]) -> Vec<BetHorse> {
    horses.iter().map(|h| BetHorse::from(*h)).collect()
}

/// Build recommendations from classified groups and detector output.
pub fn generate_bet_recommendations(
    groups: &[TierGroup],
    specials: &SpecialAnalyses,
    ctx: GenerationContext<'_>,
) -> BetRecommendations {
    let race_number = ctx.race.race_number;
    let view = TierView::new(groups);
    let mut slate = BetSlate::new(ctx);

    tier1::generate(&mut slate, &view);
    tier2::generate(&mut slate, &view);
    tier3::generate(&mut slate, &view, specials);
    special::generate(&mut slate, &view, specials);

    let bets = postprocess::run(slate.into_bets(), ctx.bankroll);
    assemble(race_number, bets)
}

fn assemble(race_number: u32, bets: Vec<GeneratedBet>) -> BetRecommendations {
    if bets.is_empty() {
        return BetRecommendations::empty(race_number);
    }

    let mut tier_bets: Vec<TierBets> = Vec::new();
    let mut special_bets = SpecialBets::default();

    for bet in bets {
        match bet.section {
            BetSection::Tier => match tier_bets.iter_mut().find(|t| t.tier == bet.tier) {
                Some(group) => group.bets.push(bet),
                None => tier_bets.push(TierBets {
                    tier: bet.tier,
                    name: crate::classifier::tier_metadata(bet.tier).0.to_string(),
                    bets: vec![bet],
                    total_cost: 0.0,
                }),
            },
            BetSection::Nuclear => special_bets.nuclear.push(bet),
            BetSection::HiddenValue => special_bets.hidden_value.push(bet),
            BetSection::HighEv => special_bets.high_ev.push(bet),
        }
    }

    tier_bets.sort_by_key(|t| t.tier.index());
    for group in &mut tier_bets {
        group.total_cost = group.bets.iter().map(|b| b.total_cost).sum();
    }

    let all: Vec<&GeneratedBet> = tier_bets
        .iter()
        .flat_map(|t| t.bets.iter())
        .chain(special_bets.iter())
        .collect();

    let total_cost: f64 = all.iter().map(|b| b.total_cost).sum();
    let potential_return = PotentialReturn {
        min: all
            .iter()
            .map(|b| b.potential_return.min)
            .fold(f64::INFINITY, f64::min),
        max: all.iter().map(|b| b.potential_return.max).sum(),
    };
    let recommended_count = all.iter().filter(|b| b.is_recommended).count();
    let summary = format!(
        "Race {}: {} bet(s) for {}, {} recommended",
        race_number,
        all.len(),
        format_currency(total_cost),
        recommended_count
    );

    BetRecommendations {
        race_number,
        tier_bets,
        special_bets,
        total_cost,
        potential_return,
        recommended_count,
        summary,
    }
}

/// Runs the detectors and generation for a classified race
pub struct BetGenerator<'a> {
    longshots: &'a dyn LongshotDetector,
    hidden_values: &'a dyn HiddenValueDetector,
    config: &'a AppConfig,
}

impl<'a> BetGenerator<'a> {
    pub fn new(
        longshots: &'a dyn LongshotDetector,
        hidden_values: &'a dyn HiddenValueDetector,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            longshots,
            hidden_values,
            config,
        }
    }

    /// Generate recommendations. A detector failure is logged and returned;
    /// the caller decides whether to fall back to [`BetRecommendations::empty`].
    pub fn generate(
        &self,
        race: &RaceInfo,
        analyses: &[HorseAnalysis],
        groups: &[TierGroup],
    ) -> Result<BetRecommendations, RecommendationError> {
        let specials = self.detect(race, analyses)?;
        let ctx = GenerationContext::new(race, analyses, self.config);
        Ok(generate_bet_recommendations(groups, &specials, ctx))
    }

    fn detect(&self, race: &RaceInfo, analyses: &[HorseAnalysis]) -> Result<SpecialAnalyses, RecommendationError> {
        let fail = |err: AnalysisError| {
            let err = RecommendationError::collaborator(race.race_number, err);
            let RecommendationError::Collaborator { component, source, .. } = &err;
            error!(
                race = race.race_number,
                component = %component,
                "Bet generation failed: {}",
                source
            );
            err
        };

        let longshots = self.longshots.detect(race, analyses).map_err(fail)?;
        let hidden_values = self.hidden_values.detect(race, analyses).map_err(fail)?;

        Ok(SpecialAnalyses {
            longshots,
            hidden_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::SpecialCategory;
    use crate::classifier::TierClassifier;
    use crate::config::RiskProfile;
    use crate::detectors::{LongshotClass, OddsLongshotDetector, ScoreGapHiddenValueDetector};
    use crate::error::Component;
    use crate::odds::{fair_odds, format_odds, implied_probability};
    use crate::overlay::{FieldShareAnalyzer, OverlayAnalysis, OverlayAnalyzer, OverlayRecommendation};
    use crate::types::{FieldInput, HorseEntry, HorseScore};

    fn analyze(specs: &[(u32, f64, &str)], config: &AppConfig) -> (Vec<HorseAnalysis>, Vec<TierGroup>) {
        analyze_with(specs, &FieldShareAnalyzer::default(), config)
    }

    fn analyze_with(
        specs: &[(u32, f64, &str)],
        analyzer: &dyn OverlayAnalyzer,
        config: &AppConfig,
    ) -> (Vec<HorseAnalysis>, Vec<TierGroup>) {
        let entries: Vec<HorseEntry> = specs
            .iter()
            .map(|(n, _, odds)| HorseEntry::new(*n, format!("Horse {}", n), *odds))
            .collect();
        let scores: Vec<HorseScore> = specs.iter().map(|(_, s, _)| HorseScore::from_base(*s)).collect();
        let inputs: Vec<FieldInput<'_>> = entries
            .iter()
            .zip(scores.iter())
            .enumerate()
            .map(|(i, (h, s))| FieldInput::new(h, i, s))
            .collect();

        let classifier = TierClassifier::new(analyzer, &config.scoring, &config.features);
        let analyses = classifier.analyze_field(&inputs).unwrap();
        let groups = crate::classifier::classify_analyzed(&analyses, &config.scoring, &config.features);
        (analyses, groups)
    }

    fn recommend(specs: &[(u32, f64, &str)], config: &AppConfig) -> BetRecommendations {
        let (analyses, groups) = analyze(specs, config);
        let race = RaceInfo::new(5);
        BetGenerator::new(
            &OddsLongshotDetector::default(),
            &ScoreGapHiddenValueDetector::default(),
            config,
        )
        .generate(&race, &analyses, &groups)
        .unwrap()
    }

    fn full_field() -> Vec<(u32, f64, &'static str)> {
        vec![
            (1, 215.0, "8-5"),
            (2, 196.0, "3-1"),
            (3, 188.0, "9-2"),
            (4, 172.0, "6-1"),
            (5, 165.0, "12-1"),
            (6, 152.0, "30-1"),
            (7, 146.0, "20-1"),
            (8, 110.0, "50-1"),
        ]
    }

    #[test]
    fn test_single_horse_gets_win_bet() {
        let config = AppConfig::default();
        let (_, groups) = analyze(&[(3, 195.0, "3-1")], &config);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tier, Tier::Tier1);

        let recs = recommend(&[(3, 195.0, "3-1")], &config);
        let win = recs
            .all_bets()
            .find(|b| b.bet_type == BetType::Win)
            .expect("win bet");
        assert!(win.amount > 0.0);
        assert!(win.window_instruction.contains("WIN"));
        assert!(win.window_instruction.contains('3'));
        // No exotics from a one-horse field
        assert!(recs.all_bets().all(|b| b.bet_type.is_straight()));
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let config = AppConfig::default();
        let recs = recommend(&[], &config);

        assert!(recs.is_empty());
        assert_eq!(recs.total_cost, 0.0);
        assert_eq!(recs.recommended_count, 0);
        assert_eq!(recs, BetRecommendations::empty(5));
    }

    #[test]
    fn test_no_zero_cost_bets() {
        for risk in [RiskProfile::Conservative, RiskProfile::Moderate, RiskProfile::Aggressive] {
            for budget in [5.0, 20.0, 100.0, 500.0] {
                let mut config = AppConfig::default();
                config.bankroll.risk_profile = risk;
                config.bankroll.race_budget = budget;

                let recs = recommend(&full_field(), &config);
                for bet in recs.all_bets() {
                    assert!(bet.amount > 0.0, "{:?}", bet.bet_type);
                    assert!(bet.total_cost > 0.0);
                    assert!(bet.amount.is_finite() && bet.total_cost.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_no_duplicate_bets() {
        let config = AppConfig::default();
        let recs = recommend(&full_field(), &config);

        let mut keys: Vec<_> = recs.all_bets().map(|b| b.dedup_key()).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(total > 0);
    }

    #[test]
    fn test_conservative_never_recommends_tier3() {
        let mut config = AppConfig::default();
        config.bankroll.risk_profile = RiskProfile::Conservative;
        let recs = recommend(&full_field(), &config);

        for bet in recs.all_bets() {
            if bet.tier == Tier::Tier3 {
                assert!(!bet.is_recommended);
            }
        }
    }

    #[test]
    fn test_simple_mode_only_straight_bets() {
        let mut config = AppConfig::default();
        config.bankroll.complexity_mode = ComplexityMode::Simple;
        let recs = recommend(&full_field(), &config);

        assert!(!recs.is_empty());
        assert!(recs.all_bets().all(|b| b.bet_type.is_straight()));
    }

    #[test]
    fn test_moderate_mode_has_no_trifectas() {
        let mut config = AppConfig::default();
        config.bankroll.complexity_mode = ComplexityMode::Moderate;
        let recs = recommend(&full_field(), &config);

        assert!(recs.all_bets().all(|b| b.bet_type.positions() <= 2));
    }

    #[test]
    fn test_tier_budgets_respected() {
        let mut config = AppConfig::default();
        config.bankroll.race_budget = 20.0;
        let recs = recommend(&full_field(), &config);

        let report = crate::sizing::validate_budget(&recs.all_bets().cloned().collect::<Vec<_>>(), &config.bankroll);
        assert!(!report.is_over_budget);
        assert!(recs.total_cost <= 20.0 + 1e-6);
    }

    #[test]
    fn test_totals_match_bets() {
        let config = AppConfig::default();
        let recs = recommend(&full_field(), &config);

        let sum: f64 = recs.all_bets().map(|b| b.total_cost).sum();
        assert!((recs.total_cost - sum).abs() < 1e-9);
        assert_eq!(recs.recommended_count, recs.all_bets().filter(|b| b.is_recommended).count());
        for group in &recs.tier_bets {
            assert!(!group.bets.is_empty());
            assert!(group.bets.iter().all(|b| b.tier == group.tier));
        }
    }

    #[test]
    fn test_every_bet_is_explained() {
        let config = AppConfig::default();
        let recs = recommend(&full_field(), &config);

        for bet in recs.all_bets() {
            assert!(!bet.narrative.is_empty());
            assert!(!bet.explanation.is_empty());
            assert!(!bet.window_instruction.is_empty());
        }
    }

    struct BrokenLongshots;

    impl LongshotDetector for BrokenLongshots {
        fn detect(&self, _: &RaceInfo, _: &[HorseAnalysis]) -> Result<Vec<LongshotAnalysis>, AnalysisError> {
            Err(AnalysisError::Longshot("odds feed unavailable".to_string()))
        }
    }

    #[test]
    fn test_detector_failure_is_returned() {
        let config = AppConfig::default();
        let (analyses, groups) = analyze(&full_field(), &config);
        let race = RaceInfo::new(7);

        let result = BetGenerator::new(&BrokenLongshots, &ScoreGapHiddenValueDetector::default(), &config)
            .generate(&race, &analyses, &groups);

        match result {
            Err(RecommendationError::Collaborator { race, component, .. }) => {
                assert_eq!(race, 7);
                assert_eq!(component, Component::LongshotDetector);
            }
            other => panic!("expected collaborator error, got {:?}", other),
        }

        let fallback = BetRecommendations::empty(7);
        assert!(fallback.is_empty());
        assert_eq!(fallback.race_number, 7);
    }

    /// Prices every horse at a fixed overlay, zero unless listed.
    struct FixedOverlay(Vec<(u32, f64)>);

    impl OverlayAnalyzer for FixedOverlay {
        fn analyze(
            &self,
            program: ProgramNumber,
            _base_score: f64,
            _field_scores: &[f64],
            odds: f64,
        ) -> Result<OverlayAnalysis, AnalysisError> {
            let overlay_percent = self
                .0
                .iter()
                .find(|(p, _)| ProgramNumber(*p) == program)
                .map(|(_, o)| *o)
                .unwrap_or(0.0);
            let implied = implied_probability(odds) * 100.0;
            let expected = implied * (1.0 + overlay_percent / 100.0);
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

    struct FlaggedLongshots(Vec<(u32, LongshotClass)>);

    impl LongshotDetector for FlaggedLongshots {
        fn detect(&self, _: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<LongshotAnalysis>, AnalysisError> {
            Ok(horses
                .iter()
                .filter_map(|h| {
                    let (_, class) = self.0.iter().find(|(p, _)| ProgramNumber(*p) == h.program_number)?;
                    Some(LongshotAnalysis {
                        program_number: h.program_number,
                        class: *class,
                        odds: h.odds,
                        overlay_percent: h.overlay.overlay_percent,
                        reasoning: format!("#{} flagged {:?}", h.program_number, class),
                    })
                })
                .collect())
        }
    }

    struct FlaggedHiddenValue(Vec<u32>);

    impl HiddenValueDetector for FlaggedHiddenValue {
        fn detect(&self, _: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<HiddenValue>, AnalysisError> {
            Ok(horses
                .iter()
                .filter(|h| self.0.contains(&h.program_number.0))
                .map(|h| HiddenValue {
                    program_number: h.program_number,
                    odds: h.odds,
                    overlay_percent: h.overlay.overlay_percent,
                    gap_from_best: 10.0,
                    reasoning: format!("#{} hidden value", h.program_number),
                })
                .collect())
        }
    }

    /// Field of `(program, base, odds, overlay)` run through flagged detectors.
    fn recommend_flagged(
        specs: &[(u32, f64, &str, f64)],
        longshots: Vec<(u32, LongshotClass)>,
        hidden: Vec<u32>,
        config: &AppConfig,
    ) -> BetRecommendations {
        let field: Vec<(u32, f64, &str)> = specs.iter().map(|(p, s, o, _)| (*p, *s, *o)).collect();
        let analyzer = FixedOverlay(specs.iter().map(|(p, _, _, ov)| (*p, *ov)).collect());
        let (analyses, groups) = analyze_with(&field, &analyzer, config);

        BetGenerator::new(&FlaggedLongshots(longshots), &FlaggedHiddenValue(hidden), config)
            .generate(&RaceInfo::new(5), &analyses, &groups)
            .unwrap()
    }

    fn large_budget() -> AppConfig {
        let mut config = AppConfig::default();
        config.bankroll.race_budget = 1000.0;
        config
    }

    fn bets_on(recs: &BetRecommendations, program: u32) -> Vec<&GeneratedBet> {
        recs.all_bets()
            .filter(|b| b.horses.len() == 1 && b.horses[0].program_number == ProgramNumber(program))
            .collect()
    }

    fn is_win_type(bet_type: BetType) -> bool {
        matches!(bet_type, BetType::Win | BetType::ValueBomb | BetType::HiddenGem)
    }

    #[test]
    fn test_tier3_value_bomb_replaces_win_and_place() {
        let config = large_budget();
        // #2 and #3 land in tier3; tier3 confidence 67 gives a $1 unit
        let specs = [
            (1, 200.0, "2-1", 0.0),
            (2, 150.0, "20-1", 60.0),
            (3, 148.0, "15-1", 40.0),
        ];
        let recs = recommend_flagged(&specs, vec![(2, LongshotClass::Nuclear)], vec![], &config);

        let flagged = bets_on(&recs, 2);
        assert_eq!(flagged.len(), 1, "{:?}", flagged.iter().map(|b| b.bet_type).collect::<Vec<_>>());
        assert_eq!(flagged[0].bet_type, BetType::ValueBomb);
        assert_eq!(flagged[0].special_category, Some(SpecialCategory::ValueBomb));
        assert!((flagged[0].amount - 1.5).abs() < 1e-9);
        // Covered by the value bomb, so no separate nuclear play
        assert!(recs.special_bets.nuclear.is_empty());

        let win = bets_on(&recs, 3)
            .into_iter()
            .find(|b| b.bet_type == BetType::Win)
            .expect("tier3 win");
        let place = bets_on(&recs, 3)
            .into_iter()
            .find(|b| b.bet_type == BetType::Place)
            .expect("tier3 place");
        assert_eq!(win.tier, Tier::Tier3);
        assert!((place.amount - win.amount * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_value_bomb_blocks_high_ev_win() {
        let config = large_budget();
        // #4 is overlaid enough for a high-EV play but already carries a live value bomb
        let specs = [
            (1, 185.0, "2-1", 0.0),
            (2, 180.0, "3-1", 0.0),
            (3, 175.0, "4-1", 0.0),
            (4, 140.0, "20-1", 60.0),
        ];
        let recs = recommend_flagged(&specs, vec![(4, LongshotClass::Live)], vec![], &config);

        let win_types: Vec<BetType> = bets_on(&recs, 4)
            .into_iter()
            .map(|b| b.bet_type)
            .filter(|t| is_win_type(*t))
            .collect();
        assert_eq!(win_types, vec![BetType::ValueBomb]);
        assert!(recs.special_bets.high_ev.is_empty());

        let bomb = bets_on(&recs, 4)[0];
        assert!((bomb.amount - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier2_place_needs_overlay() {
        let config = large_budget();

        let overlaid = recommend_flagged(&[(1, 200.0, "2-1", 0.0), (2, 170.0, "5-1", 35.0)], vec![], vec![], &config);
        let place = bets_on(&overlaid, 2)
            .into_iter()
            .find(|b| b.bet_type == BetType::Place)
            .expect("tier2 place");
        assert_eq!(place.tier, Tier::Tier2);
        assert_eq!(place.section, BetSection::Tier);

        let thin = recommend_flagged(&[(1, 200.0, "2-1", 0.0), (2, 170.0, "5-1", 20.0)], vec![], vec![], &config);
        assert!(bets_on(&thin, 2).iter().any(|b| b.bet_type == BetType::Win));
        assert!(!bets_on(&thin, 2).iter().any(|b| b.bet_type == BetType::Place));
    }

    #[test]
    fn test_hidden_value_gem_and_place() {
        let config = large_budget();
        let specs = [(1, 200.0, "2-1", 0.0), (2, 170.0, "5-1", 20.0)];
        let recs = recommend_flagged(&specs, vec![], vec![2], &config);

        let hidden = &recs.special_bets.hidden_value;
        assert_eq!(hidden.len(), 2);
        let gem = hidden.iter().find(|b| b.bet_type == BetType::HiddenGem).expect("hidden gem");
        let place = hidden.iter().find(|b| b.bet_type == BetType::Place).expect("place saver");

        // Tier2 unit at confidence 71 is $2
        assert!((gem.amount - 2.0).abs() < 1e-9);
        assert!((place.amount - gem.amount * 0.6).abs() < 1e-9);
        assert!(hidden.iter().all(|b| b.special_category == Some(SpecialCategory::Diamond)));
        assert!(hidden.iter().all(|b| b.tier == Tier::Tier2));
    }

    #[test]
    fn test_high_ev_stake_scales_with_ev() {
        let config = large_budget();
        // #2 sits below every tier, so its only bet is the high-EV win
        let specs = [(1, 200.0, "2-1", 0.0), (2, 120.0, "10-1", 60.0)];
        let recs = recommend_flagged(&specs, vec![], vec![], &config);

        assert_eq!(recs.special_bets.high_ev.len(), 1);
        let bet = &recs.special_bets.high_ev[0];
        assert_eq!(bet.bet_type, BetType::Win);
        assert_eq!(bet.horses[0].program_number, ProgramNumber(2));
        // $2 unit x (1 + 0.6 per dollar)
        assert!((bet.amount - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_high_ev_stake_capped_by_tier2_share() {
        let mut config = AppConfig::default();
        config.bankroll.base_unit = 10.0;
        let specs = [(1, 200.0, "2-1", 0.0), (2, 120.0, "10-1", 60.0)];
        let recs = recommend_flagged(&specs, vec![], vec![], &config);

        // Tier2 holds 30% of $100 spread over 4 bets
        let cap = 100.0 * 0.30 / 4.0;
        let bet = &recs.special_bets.high_ev[0];
        assert!((bet.amount - cap).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_longshot_stakes() {
        let config = large_budget();
        // Neither longshot makes a tier, so both go to the nuclear section
        let specs = [
            (1, 200.0, "2-1", 0.0),
            (2, 120.0, "30-1", 0.0),
            (3, 118.0, "12-1", 0.0),
        ];
        let recs = recommend_flagged(
            &specs,
            vec![(2, LongshotClass::Nuclear), (3, LongshotClass::Live)],
            vec![],
            &config,
        );

        let nuclear = &recs.special_bets.nuclear;
        assert_eq!(nuclear.len(), 2);
        let bomb = nuclear.iter().find(|b| b.horses[0].program_number == ProgramNumber(2)).unwrap();
        let live = nuclear.iter().find(|b| b.horses[0].program_number == ProgramNumber(3)).unwrap();

        assert_eq!(bomb.bet_type, BetType::Win);
        assert_eq!(bomb.amount, 5.0);
        assert_eq!(bomb.special_category, Some(SpecialCategory::Nuclear));
        assert_eq!(live.amount, 3.0);
        assert_eq!(live.special_category, Some(SpecialCategory::ValueBomb));
    }

    #[test]
    fn test_superfecta_stake_floor() {
        let specs = [
            (1, 200.0, "2-1", 0.0),
            (2, 190.0, "3-1", 0.0),
            (3, 170.0, "5-1", 0.0),
            (4, 165.0, "6-1", 0.0),
            (5, 150.0, "20-1", 60.0),
            (6, 100.0, "30-1", 0.0),
        ];

        let config = large_budget();
        let recs = recommend_flagged(&specs, vec![], vec![], &config);
        let dime = recs
            .all_bets()
            .find(|b| b.bet_type == BetType::Superfecta)
            .expect("superfecta");
        assert!((dime.amount - 0.1).abs() < 1e-9);
        assert_eq!(dime.total_cost, 2.4);

        let mut config = large_budget();
        config.betting.superfecta_min_stake = 0.5;
        let recs = recommend_flagged(&specs, vec![], vec![], &config);
        let floored = recs
            .all_bets()
            .find(|b| b.bet_type == BetType::Superfecta)
            .expect("superfecta");
        assert_eq!(floored.amount, 0.5);
        assert_eq!(floored.total_cost, 12.0);
    }

    #[test]
    fn test_complexity_gate() {
        assert!(complexity_allows(ComplexityMode::Simple, BetType::HiddenGem));
        assert!(!complexity_allows(ComplexityMode::Simple, BetType::Quinella));
        assert!(complexity_allows(ComplexityMode::Moderate, BetType::ExactaKeyUnder));
        assert!(!complexity_allows(ComplexityMode::Moderate, BetType::TrifectaWheel));
        assert!(complexity_allows(ComplexityMode::Advanced, BetType::Superfecta));
    }
}
