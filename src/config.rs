//! Configuration for classification, box selection, sizing and bet generation.

use serde::{Deserialize, Serialize};

/// Tier thresholds and score scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Ceiling of the base score scale, used for confidence rescaling
    #[serde(default = "default_max_base_score")]
    pub max_base_score: f64,
    #[serde(default = "default_tier1_min")]
    pub tier1_min: f64,
    #[serde(default = "default_tier1_min_confidence")]
    pub tier1_min_confidence: u8,
    #[serde(default = "default_tier2_min")]
    pub tier2_min: f64,
    #[serde(default = "default_tier2_max")]
    pub tier2_max: f64,
    #[serde(default = "default_tier3_min")]
    pub tier3_min: f64,
    #[serde(default = "default_tier3_max")]
    pub tier3_max: f64,
    /// Slack added to the tier2/tier3 upper bounds so overlay bonuses don't drop a horse
    #[serde(default = "default_band_tolerance")]
    pub band_tolerance: f64,
    /// Tier3 exists to surface value; horses below this overlay are dropped
    #[serde(default = "default_tier3_min_overlay")]
    pub tier3_min_overlay: f64,
    /// Fractional odds used when the odds string can't be parsed
    #[serde(default = "default_fallback_odds")]
    pub fallback_odds: f64,
}

fn default_max_base_score() -> f64 {
    328.0
}

fn default_tier1_min() -> f64 {
    180.0
}

fn default_tier1_min_confidence() -> u8 {
    70
}

fn default_tier2_min() -> f64 {
    160.0
}

fn default_tier2_max() -> f64 {
    179.0
}

fn default_tier3_min() -> f64 {
    140.0
}

fn default_tier3_max() -> f64 {
    159.0
}

fn default_band_tolerance() -> f64 {
    20.0
}

fn default_tier3_min_overlay() -> f64 {
    25.0
}

fn default_fallback_odds() -> f64 {
    10.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_base_score: default_max_base_score(),
            tier1_min: default_tier1_min(),
            tier1_min_confidence: default_tier1_min_confidence(),
            tier2_min: default_tier2_min(),
            tier2_max: default_tier2_max(),
            tier3_min: default_tier3_min(),
            tier3_max: default_tier3_max(),
            band_tolerance: default_band_tolerance(),
            tier3_min_overlay: default_tier3_min_overlay(),
            fallback_odds: default_fallback_odds(),
        }
    }
}

/// Feature toggles, passed explicitly to every function that reads them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Filter exotic boxes by score separation from the leader
    #[serde(default = "default_true")]
    pub box_separation_enabled: bool,
    /// Maximum points behind the leader for a box member (one tier width)
    #[serde(default = "default_box_separation_threshold")]
    pub box_separation_threshold: f64,
    /// Nudge confidence by market odds
    #[serde(default)]
    pub odds_confidence_enabled: bool,
    /// Attach advisory field-relative metrics
    #[serde(default = "default_true")]
    pub field_relative_enabled: bool,
    /// Minimum lead over the next horse to count as a standout
    #[serde(default = "default_standout_gap")]
    pub standout_gap: f64,
}

fn default_true() -> bool {
    true
}

fn default_box_separation_threshold() -> f64 {
    20.0
}

fn default_standout_gap() -> f64 {
    15.0
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            box_separation_enabled: true,
            box_separation_threshold: default_box_separation_threshold(),
            odds_confidence_enabled: false,
            field_relative_enabled: true,
            standout_gap: default_standout_gap(),
        }
    }
}

/// Risk profile chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "conservative" | "safe" => Some(RiskProfile::Conservative),
            "moderate" | "balanced" => Some(RiskProfile::Moderate),
            "aggressive" => Some(RiskProfile::Aggressive),
            _ => None,
        }
    }
}

/// Which bet types the user wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityMode {
    /// Straight bets only
    Simple,
    /// Straight bets plus exacta and quinella
    Moderate,
    #[default]
    Advanced,
}

impl ComplexityMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Some(ComplexityMode::Simple),
            "moderate" => Some(ComplexityMode::Moderate),
            "advanced" | "all" => Some(ComplexityMode::Advanced),
            _ => None,
        }
    }
}

/// Bankroll settings (read-only to the core)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankrollConfig {
    #[serde(default)]
    pub complexity_mode: ComplexityMode,
    #[serde(default)]
    pub risk_profile: RiskProfile,
    /// Maximum total stake for one race
    #[serde(default = "default_race_budget")]
    pub race_budget: f64,
    #[serde(default = "default_base_unit")]
    pub base_unit: f64,
    #[serde(default = "default_min_bet")]
    pub min_bet: f64,
    #[serde(default = "default_max_bet")]
    pub max_bet: f64,
    /// Number of bets a tier budget is expected to be shared across
    #[serde(default = "default_bets_per_tier")]
    pub bets_per_tier: usize,
}

fn default_race_budget() -> f64 {
    100.0
}

fn default_base_unit() -> f64 {
    2.0
}

fn default_min_bet() -> f64 {
    1.0
}

fn default_max_bet() -> f64 {
    50.0
}

fn default_bets_per_tier() -> usize {
    4
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            complexity_mode: ComplexityMode::default(),
            risk_profile: RiskProfile::default(),
            race_budget: default_race_budget(),
            base_unit: default_base_unit(),
            min_bet: default_min_bet(),
            max_bet: default_max_bet(),
            bets_per_tier: default_bets_per_tier(),
        }
    }
}

/// Bet generation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingConfig {
    /// Minimum overlay for a tier2 place bet
    #[serde(default = "default_place_min_overlay")]
    pub place_min_overlay: f64,
    /// Minimum active runners for a superfecta box
    #[serde(default = "default_superfecta_min_field")]
    pub superfecta_min_field: usize,
    /// Smallest per-combination superfecta stake the track takes
    #[serde(default = "default_superfecta_min_stake")]
    pub superfecta_min_stake: f64,
    #[serde(default = "default_high_ev_min_overlay")]
    pub high_ev_min_overlay: f64,
    /// Minimum fractional odds for a high-EV overlay bet
    #[serde(default = "default_high_ev_min_odds")]
    pub high_ev_min_odds: f64,
    #[serde(default = "default_nuclear_stake")]
    pub nuclear_stake: f64,
    #[serde(default = "default_live_stake")]
    pub live_stake: f64,
    /// Place leg of a hidden value pair as a share of the win leg
    #[serde(default = "default_hidden_value_place_ratio")]
    pub hidden_value_place_ratio: f64,
    /// Tier3 horses considered for bets
    #[serde(default = "default_max_longshots")]
    pub max_longshots: usize,
}

fn default_place_min_overlay() -> f64 {
    30.0
}

fn default_superfecta_min_field() -> usize {
    6
}

fn default_superfecta_min_stake() -> f64 {
    0.1
}

fn default_high_ev_min_overlay() -> f64 {
    50.0
}

fn default_high_ev_min_odds() -> f64 {
    4.0
}

fn default_nuclear_stake() -> f64 {
    5.0
}

fn default_live_stake() -> f64 {
    3.0
}

fn default_hidden_value_place_ratio() -> f64 {
    0.6
}

fn default_max_longshots() -> usize {
    3
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            place_min_overlay: default_place_min_overlay(),
            superfecta_min_field: default_superfecta_min_field(),
            superfecta_min_stake: default_superfecta_min_stake(),
            high_ev_min_overlay: default_high_ev_min_overlay(),
            high_ev_min_odds: default_high_ev_min_odds(),
            nuclear_stake: default_nuclear_stake(),
            live_stake: default_live_stake(),
            hidden_value_place_ratio: default_hidden_value_place_ratio(),
            max_longshots: default_max_longshots(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub bankroll: BankrollConfig,
    #[serde(default)]
    pub betting: BettingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional `paddock` file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("paddock").required(false))
            // Override with environment variables (PADDOCK_BANKROLL__RACE_BUDGET, etc.)
            .add_source(
                config::Environment::with_prefix("PADDOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
