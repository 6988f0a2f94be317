//! Paddock: overlay-adjusted tier classification and bet recommendations.
//!
//! Pipeline: scored field -> overlay analysis -> tiers -> bets -> sizing.

pub mod betting;
pub mod box_selector;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod field;
pub mod generator;
pub mod harville;
pub mod odds;
pub mod overlay;
pub mod pipeline;
pub mod sizing;
pub mod types;
pub mod window;

pub use betting::{BetType, GeneratedBet};
pub use classifier::{classify_horses, ClassifiedHorse, TierGroup};
pub use config::AppConfig;
pub use error::{AnalysisError, RecommendationError};
pub use generator::{generate_bet_recommendations, BetGenerator, BetRecommendations};
pub use pipeline::{analyze_race, HorseScorer, ScoredField};
pub use types::{HorseEntry, HorseScore, ProgramNumber, RaceInfo, Tier};
