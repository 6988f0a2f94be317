//! Shared input types: horse identity, race info and upstream scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Program number printed on the saddle cloth. Stable across recalculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramNumber(pub u32);

impl fmt::Display for ProgramNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProgramNumber {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// Running style code from past performances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunningStyle {
    /// Early speed
    E,
    /// Early/presser
    EP,
    /// Presser
    P,
    /// Sustained closer
    S,
    #[default]
    Unknown,
}

/// Horse identity record from the race card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseEntry {
    pub program_number: ProgramNumber,
    pub name: String,
    /// Market odds as printed: "5-2", "5/2", "EVEN" or "3.5"
    pub odds: String,
    #[serde(default)]
    pub post_position: u32,
    #[serde(default)]
    pub running_style: RunningStyle,
    #[serde(default)]
    pub scratched: bool,
}

impl HorseEntry {
    pub fn new(program_number: u32, name: impl Into<String>, odds: impl Into<String>) -> Self {
        Self {
            program_number: ProgramNumber(program_number),
            name: name.into(),
            odds: odds.into(),
            post_position: program_number,
            running_style: RunningStyle::Unknown,
            scratched: false,
        }
    }
}

/// Surface condition reported by the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackCondition {
    #[default]
    Fast,
    Good,
    Firm,
    Yielding,
    Muddy,
    Sloppy,
}

/// Race-level context shared by every horse in the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceInfo {
    pub race_number: u32,
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub track_condition: TrackCondition,
    /// Entries including scratches
    #[serde(default)]
    pub field_size: u32,
}

impl RaceInfo {
    pub fn new(race_number: u32) -> Self {
        Self {
            race_number,
            track: String::new(),
            track_condition: TrackCondition::default(),
            field_size: 0,
        }
    }
}

/// Upstream confidence in the data behind a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    #[default]
    Medium,
    Low,
}

/// Points per handicapping category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub connections: f64,
    #[serde(default)]
    pub post_position: f64,
    #[serde(default)]
    pub speed_class: f64,
    #[serde(default)]
    pub form: f64,
    #[serde(default)]
    pub equipment: f64,
    #[serde(default)]
    pub pace: f64,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> f64 {
        self.connections + self.post_position + self.speed_class + self.form + self.equipment + self.pace
    }
}

/// Score produced by the scoring engine for one horse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseScore {
    pub total: f64,
    pub base_score: f64,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub is_scratched: bool,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    /// 0-100
    #[serde(default = "default_data_quality")]
    pub data_quality: f64,
}

fn default_data_quality() -> f64 {
    75.0
}

impl HorseScore {
    /// Score with `total == base_score` and an empty breakdown.
    pub fn from_base(base_score: f64) -> Self {
        Self {
            total: base_score,
            base_score,
            breakdown: ScoreBreakdown::default(),
            is_scratched: false,
            confidence_level: ConfidenceLevel::default(),
            data_quality: default_data_quality(),
        }
    }

    pub fn scratched(mut self) -> Self {
        self.is_scratched = true;
        self
    }

    /// Base score clamped to be non-negative.
    pub fn base(&self) -> f64 {
        if self.base_score.is_finite() {
            self.base_score.max(0.0)
        } else {
            0.0
        }
    }
}

/// One horse of the field as handed to the classifier
#[derive(Debug, Clone, Copy)]
pub struct FieldInput<'a> {
    pub horse: &'a HorseEntry,
    pub index: usize,
    pub score: &'a HorseScore,
}

impl<'a> FieldInput<'a> {
    pub fn new(horse: &'a HorseEntry, index: usize, score: &'a HorseScore) -> Self {
        Self { horse, index, score }
    }
}

/// Betting tier, tier1 being the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
        }
    }

    /// Strength rank, higher is stronger.
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Tier1 => 3,
            Tier::Tier2 => 2,
            Tier::Tier3 => 1,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tier::Tier1 => 0,
            Tier::Tier2 => 1,
            Tier::Tier3 => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
