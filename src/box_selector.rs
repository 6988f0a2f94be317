//! Box selection for multi-horse exotic bets.
//!
//! Only horses within a score separation of the leader are "live" enough to
//! box. The default separation is one tier width: a horse further back is
//! presumptively a tier below the leader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::ClassifiedHorse;
use crate::config::FeatureConfig;
use crate::types::ProgramNumber;

/// Box selection limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSelectionConfig {
    pub max_score_separation: f64,
    pub max_horses: usize,
    pub min_horses: usize,
    /// When false, take the top `max_horses` with no separation filter
    pub separation_enabled: bool,
}

impl BoxSelectionConfig {
    /// Limits for a box of `min_horses..=max_horses` using the feature toggles.
    pub fn from_features(features: &FeatureConfig, min_horses: usize, max_horses: usize) -> Self {
        Self {
            max_score_separation: features.box_separation_threshold,
            max_horses,
            min_horses,
            separation_enabled: features.box_separation_enabled,
        }
    }
}

impl Default for BoxSelectionConfig {
    fn default() -> Self {
        Self::from_features(&FeatureConfig::default(), 2, 4)
    }
}

/// Outcome of a box selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSelectionResult {
    pub selected_horses: Vec<ClassifiedHorse>,
    pub excluded_horses: Vec<ClassifiedHorse>,
    /// Reasons for horses excluded by score gap. Capacity cut-offs have none.
    pub exclusion_reasons: BTreeMap<ProgramNumber, String>,
    pub is_valid_box: bool,
    pub summary: String,
}

impl BoxSelectionResult {
    pub fn program_numbers(&self) -> Vec<ProgramNumber> {
        self.selected_horses.iter().map(|h| h.program_number).collect()
    }
}

/// Pick box members from `candidates`, which must be sorted by adjusted score descending.
pub fn select_box_horses(candidates: &[ClassifiedHorse], config: &BoxSelectionConfig) -> BoxSelectionResult {
    if candidates.len() < config.min_horses {
        return BoxSelectionResult {
            selected_horses: candidates.to_vec(),
            excluded_horses: Vec::new(),
            exclusion_reasons: BTreeMap::new(),
            is_valid_box: false,
            summary: format!(
                "Only {} candidate(s), a box needs at least {}",
                candidates.len(),
                config.min_horses
            ),
        };
    }

    if !config.separation_enabled {
        let take = config.max_horses.min(candidates.len());
        let selected = candidates[..take].to_vec();
        let excluded = candidates[take..].to_vec();
        let is_valid_box = selected.len() >= config.min_horses;
        let summary = format!("Top {} by score (separation filter off)", selected.len());
        return BoxSelectionResult {
            selected_horses: selected,
            excluded_horses: excluded,
            exclusion_reasons: BTreeMap::new(),
            is_valid_box,
            summary,
        };
    }

    let leader_score = candidates[0].adjusted_score;
    let cutoff = leader_score - config.max_score_separation;

    let mut selected = Vec::new();
    let mut excluded = Vec::new();
    let mut exclusion_reasons = BTreeMap::new();

    for horse in candidates {
        if horse.adjusted_score < cutoff {
            let gap = leader_score - horse.adjusted_score;
            exclusion_reasons.insert(
                horse.program_number,
                format!(
                    "#{} is {:.1} pts behind the leader (max separation {:.1})",
                    horse.program_number, gap, config.max_score_separation
                ),
            );
            excluded.push(horse.clone());
        } else if selected.len() < config.max_horses {
            selected.push(horse.clone());
        } else {
            excluded.push(horse.clone());
        }
    }

    let is_valid_box = selected.len() >= config.min_horses;
    let summary = if is_valid_box {
        format!(
            "{} horse(s) within {:.0} pts of the leader",
            selected.len(),
            config.max_score_separation
        )
    } else {
        format!(
            "Only {} horse(s) within {:.0} pts of the leader, need {}",
            selected.len(),
            config.max_score_separation,
            config.min_horses
        )
    };

    BoxSelectionResult {
        selected_horses: selected,
        excluded_horses: excluded,
        exclusion_reasons,
        is_valid_box,
        summary,
    }
}
