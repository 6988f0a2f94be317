//! Longshot and hidden-value detectors.
//!
//! Both run over every active horse (not just the classified ones) and feed
//! the special-category bets.

use serde::{Deserialize, Serialize};

use crate::classifier::HorseAnalysis;
use crate::error::AnalysisError;
use crate::types::{ProgramNumber, RaceInfo};

/// Strength of a longshot flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongshotClass {
    /// Huge price and a massive overlay
    Nuclear,
    /// Real overlay at a long price
    Live,
    /// Long price without the overlay to back it
    Lottery,
}

/// A horse flagged by the longshot detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongshotAnalysis {
    pub program_number: ProgramNumber,
    pub class: LongshotClass,
    pub odds: f64,
    pub overlay_percent: f64,
    pub reasoning: String,
}

impl LongshotAnalysis {
    /// Nuclear and live longshots are worth a bet; lottery tickets are not.
    pub fn is_qualifying(&self) -> bool {
        matches!(self.class, LongshotClass::Nuclear | LongshotClass::Live)
    }
}

/// A horse the market overlooks relative to its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenValue {
    pub program_number: ProgramNumber,
    pub odds: f64,
    pub overlay_percent: f64,
    /// Points behind the best base score in the field
    pub gap_from_best: f64,
    pub reasoning: String,
}

pub trait LongshotDetector {
    fn detect(&self, race: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<LongshotAnalysis>, AnalysisError>;
}

pub trait HiddenValueDetector {
    fn detect(&self, race: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<HiddenValue>, AnalysisError>;
}

/// Flags long prices with a score that can still contend.
#[derive(Debug, Clone)]
pub struct OddsLongshotDetector {
    pub min_odds: f64,
    pub min_adjusted_score: f64,
    pub nuclear_min_odds: f64,
    pub nuclear_min_overlay: f64,
    pub live_min_overlay: f64,
}

impl Default for OddsLongshotDetector {
    fn default() -> Self {
        Self {
            min_odds: 10.0,
            min_adjusted_score: 140.0,
            nuclear_min_odds: 25.0,
            nuclear_min_overlay: 200.0,
            live_min_overlay: 75.0,
        }
    }
}

impl OddsLongshotDetector {
    pub fn classify(&self, odds: f64, overlay_percent: f64) -> LongshotClass {
        if odds >= self.nuclear_min_odds && overlay_percent >= self.nuclear_min_overlay {
            LongshotClass::Nuclear
        } else if overlay_percent >= self.live_min_overlay {
            LongshotClass::Live
        } else {
            LongshotClass::Lottery
        }
    }
}

impl LongshotDetector for OddsLongshotDetector {
    fn detect(&self, _race: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<LongshotAnalysis>, AnalysisError> {
        let found = horses
            .iter()
            .filter(|h| h.odds >= self.min_odds && h.adjusted_score() >= self.min_adjusted_score)
            .map(|h| {
                let overlay = h.overlay.overlay_percent;
                let class = self.classify(h.odds, overlay);
                let reasoning = match class {
                    LongshotClass::Nuclear => format!(
                        "{} at {} with a {:+.0}% overlay: the price is far too big",
                        h.name, h.odds_display, overlay
                    ),
                    LongshotClass::Live => format!(
                        "{} at {} is live, {:+.0}% overlay on a {:.0} adjusted score",
                        h.name,
                        h.odds_display,
                        overlay,
                        h.adjusted_score()
                    ),
                    LongshotClass::Lottery => {
                        format!("{} at {} lacks the overlay to bet ({:+.0}%)", h.name, h.odds_display, overlay)
                    }
                };
                LongshotAnalysis {
                    program_number: h.program_number,
                    class,
                    odds: h.odds,
                    overlay_percent: overlay,
                    reasoning,
                }
            })
            .collect();

        Ok(found)
    }
}

/// Flags overlooked horses scoring close to the field's best.
#[derive(Debug, Clone)]
pub struct ScoreGapHiddenValueDetector {
    pub min_odds: f64,
    pub max_gap_from_best: f64,
    pub min_overlay: f64,
}

impl Default for ScoreGapHiddenValueDetector {
    fn default() -> Self {
        Self {
            min_odds: 6.0,
            max_gap_from_best: 15.0,
            min_overlay: 40.0,
        }
    }
}

impl HiddenValueDetector for ScoreGapHiddenValueDetector {
    fn detect(&self, _race: &RaceInfo, horses: &[HorseAnalysis]) -> Result<Vec<HiddenValue>, AnalysisError> {
        let Some(best) = horses.iter().map(|h| h.score.base()).reduce(f64::max) else {
            return Ok(Vec::new());
        };

        let found = horses
            .iter()
            .filter_map(|h| {
                let gap = best - h.score.base();
                let overlay = h.overlay.overlay_percent;
                if h.odds < self.min_odds || gap > self.max_gap_from_best || overlay < self.min_overlay {
                    return None;
                }
                Some(HiddenValue {
                    program_number: h.program_number,
                    odds: h.odds,
                    overlay_percent: overlay,
                    gap_from_best: gap,
                    reasoning: format!(
                        "{} is {:.0} pts off the top score but {} on the board ({:+.0}% overlay)",
                        h.name, gap, h.odds_display, overlay
                    ),
                })
            })
            .collect();

        Ok(found)
    }
}
