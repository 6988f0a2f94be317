//! Scoring and analysis of a whole race.
//!
//! Scores are recomputed either for the full field or, when only a few
//! horses changed, just for those horses. Both paths give the same field.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::betting::GeneratedBet;
use crate::classifier::{classify_analyzed, TierClassifier, TierGroup};
use crate::config::AppConfig;
use crate::detectors::{
    HiddenValueDetector, LongshotDetector, OddsLongshotDetector, ScoreGapHiddenValueDetector,
};
use crate::error::RecommendationError;
use crate::generator::{BetGenerator, BetRecommendations};
use crate::overlay::{FieldShareAnalyzer, OverlayAnalyzer};
use crate::sizing::{validate_budget, BudgetReport};
use crate::types::{FieldInput, HorseEntry, HorseScore, ProgramNumber, RaceInfo};

/// Most affected horses for an incremental rescore
pub const MAX_INCREMENTAL: usize = 3;

/// External scoring engine
pub trait HorseScorer {
    fn score(&self, horse: &HorseEntry, race: &RaceInfo) -> HorseScore;
}

impl<F> HorseScorer for F
where
    F: Fn(&HorseEntry, &RaceInfo) -> HorseScore,
{
    fn score(&self, horse: &HorseEntry, race: &RaceInfo) -> HorseScore {
        self(horse, race)
    }
}

/// A field with one score per entry, in entry order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredField {
    pub race: RaceInfo,
    pub entries: Vec<HorseEntry>,
    pub scores: Vec<HorseScore>,
}

impl ScoredField {
    /// Wrap precomputed scores. Missing scores are treated as zero.
    pub fn from_scores(race: RaceInfo, entries: Vec<HorseEntry>, mut scores: Vec<HorseScore>) -> Self {
        scores.resize_with(entries.len(), || HorseScore::from_base(0.0));
        Self { race, entries, scores }
    }

    /// Score every entry.
    pub fn score_all(race: &RaceInfo, entries: &[HorseEntry], scorer: &dyn HorseScorer) -> Self {
        let scores = entries.iter().map(|e| scorer.score(e, race)).collect();
        Self {
            race: race.clone(),
            entries: entries.to_vec(),
            scores,
        }
    }

    /// Rescore after a change.
    ///
    /// Only the `affected` horses are scored again when there are at most
    /// [`MAX_INCREMENTAL`] of them and the race and entry list are unchanged;
    /// anything else falls back to a full pass.
    pub fn rescore(
        &self,
        race: &RaceInfo,
        entries: &[HorseEntry],
        affected: &[ProgramNumber],
        scorer: &dyn HorseScorer,
    ) -> Self {
        let same_lineup = entries.len() == self.entries.len()
            && entries
                .iter()
                .zip(&self.entries)
                .all(|(a, b)| a.program_number == b.program_number);

        if affected.len() > MAX_INCREMENTAL || *race != self.race || !same_lineup {
            debug!(
                "Full rescore of race {} ({} affected)",
                race.race_number,
                affected.len()
            );
            return Self::score_all(race, entries, scorer);
        }

        debug!("Incremental rescore of {:?}", affected);
        let scores = entries
            .iter()
            .zip(&self.scores)
            .map(|(entry, old)| {
                if affected.contains(&entry.program_number) {
                    scorer.score(entry, race)
                } else {
                    old.clone()
                }
            })
            .collect();

        Self {
            race: race.clone(),
            entries: entries.to_vec(),
            scores,
        }
    }

    pub fn inputs(&self) -> Vec<FieldInput<'_>> {
        self.entries
            .iter()
            .zip(&self.scores)
            .enumerate()
            .map(|(i, (entry, score))| FieldInput::new(entry, i, score))
            .collect()
    }
}

/// Analysis collaborators
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub overlay: &'a dyn OverlayAnalyzer,
    pub longshots: &'a dyn LongshotDetector,
    pub hidden_values: &'a dyn HiddenValueDetector,
}

/// The built-in collaborators
#[derive(Debug, Clone, Default)]
pub struct DefaultCollaborators {
    pub overlay: FieldShareAnalyzer,
    pub longshots: OddsLongshotDetector,
    pub hidden_values: ScoreGapHiddenValueDetector,
}

impl DefaultCollaborators {
    pub fn as_collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            overlay: &self.overlay,
            longshots: &self.longshots,
            hidden_values: &self.hidden_values,
        }
    }
}

/// Classification and recommendations for one race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceAnalysis {
    pub race_number: u32,
    pub groups: Vec<TierGroup>,
    pub recommendations: BetRecommendations,
    pub budget: BudgetReport,
}

/// Classify a scored field and generate its bets.
pub fn analyze_race(
    field: &ScoredField,
    collaborators: Collaborators<'_>,
    config: &AppConfig,
) -> Result<RaceAnalysis, RecommendationError> {
    let race_number = field.race.race_number;
    let classifier = TierClassifier::new(collaborators.overlay, &config.scoring, &config.features);

    let analyses = classifier.analyze_field(&field.inputs()).map_err(|err| {
        let err = RecommendationError::collaborator(race_number, err);
        error!(race = race_number, "Classification failed: {}", err);
        err
    })?;
    let groups = classify_analyzed(&analyses, &config.scoring, &config.features);

    let recommendations = BetGenerator::new(collaborators.longshots, collaborators.hidden_values, config)
        .generate(&field.race, &analyses, &groups)?;

    let bets: Vec<GeneratedBet> = recommendations.all_bets().cloned().collect();
    let budget = validate_budget(&bets, &config.bankroll);

    Ok(RaceAnalysis {
        race_number,
        groups,
        recommendations,
        budget,
    })
}
