//! CLI commands for paddock.
//!
//! Reads a race JSON file with precomputed scores, then classifies the field
//! or builds bet recommendations.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::TierGroup;
use crate::config::{AppConfig, ComplexityMode, RiskProfile};
use crate::generator::BetRecommendations;
use crate::pipeline::{analyze_race, DefaultCollaborators, RaceAnalysis, ScoredField};
use crate::sizing::BudgetReport;
use crate::types::{HorseEntry, HorseScore, RaceInfo};
use crate::window::format_currency;

#[derive(Parser)]
#[command(name = "paddock")]
#[command(version, about = "Paddock: tier classification and bet recommendations for a race card", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a race into betting tiers
    Classify {
        /// Path to race JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Generate sized bet recommendations for a race
    Recommend {
        /// Path to race JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Risk profile (conservative, moderate, aggressive)
        #[arg(short, long)]
        risk: Option<String>,

        /// Race budget override
        #[arg(short, long)]
        budget: Option<f64>,

        /// Bet complexity (simple, moderate, advanced)
        #[arg(short, long)]
        complexity: Option<String>,
    },
}

/// Race file: race info plus each horse's entry and score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceFile {
    pub race: RaceInfo,
    pub horses: Vec<RaceFileHorse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceFileHorse {
    #[serde(flatten)]
    pub entry: HorseEntry,
    pub score: HorseScore,
}

impl RaceFile {
    pub fn into_field(self) -> ScoredField {
        let mut race = self.race;
        if race.field_size == 0 {
            race.field_size = self.horses.len() as u32;
        }
        let (entries, scores) = self.horses.into_iter().map(|h| (h.entry, h.score)).unzip();
        ScoredField::from_scores(race, entries, scores)
    }
}

fn load_race(path: &Path) -> anyhow::Result<ScoredField> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: RaceFile = serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(file.into_field())
}

fn analyze(path: &Path, config: &AppConfig) -> anyhow::Result<RaceAnalysis> {
    let field = load_race(path)?;
    eprintln!(
        "Race {}: {} entries",
        field.race.race_number,
        field.entries.len()
    );

    let collaborators = DefaultCollaborators::default();
    Ok(analyze_race(&field, collaborators.as_collaborators(), config)?)
}

/// Classify a race file and print its tiers.
pub fn run_classify(input: PathBuf, format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let analysis = analyze(&input, &config)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&analysis.groups)?),
        "table" => print_tiers(&analysis.groups),
        _ => {
            eprintln!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(&analysis.groups)?);
        }
    }

    Ok(())
}

/// Build recommendations for a race file and print them.
pub fn run_recommend(
    input: PathBuf,
    format: String,
    risk: Option<String>,
    budget: Option<f64>,
    complexity: Option<String>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;

    if let Some(risk) = risk {
        let Some(profile) = RiskProfile::from_str(&risk) else {
            bail!("unknown risk profile: {}", risk);
        };
        config.bankroll.risk_profile = profile;
    }
    if let Some(budget) = budget {
        if !budget.is_finite() || budget <= 0.0 {
            bail!("budget must be positive, got {}", budget);
        }
        config.bankroll.race_budget = budget;
    }
    if let Some(mode) = complexity {
        let Some(mode) = ComplexityMode::from_str(&mode) else {
            bail!("unknown complexity mode: {}", mode);
        };
        config.bankroll.complexity_mode = mode;
    }

    let analysis = analyze(&input, &config)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&analysis)?),
        "table" => {
            print_tiers(&analysis.groups);
            print_recommendations(&analysis.recommendations);
            print_budget(&analysis.budget);
        }
        _ => {
            eprintln!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }

    Ok(())
}

fn print_tiers(groups: &[TierGroup]) {
    if groups.is_empty() {
        println!("No horses qualify for a betting tier");
        println!();
        return;
    }

    for group in groups {
        println!("=== {} ({}) ===", group.name, group.tier);
        for horse in &group.horses {
            let flag = horse
                .special_case
                .map(|s| format!(" [{}]", s.label()))
                .unwrap_or_default();
            println!(
                "  #{:>2} {:<20} {:>6}  adj {:>6.1}  conf {:>3}  overlay {:>+7.1}%{}",
                horse.program_number,
                horse.name,
                horse.odds_display,
                horse.adjusted_score,
                horse.confidence,
                horse.overlay_percent(),
                flag
            );
        }
        println!();
    }
}

fn print_recommendations(recs: &BetRecommendations) {
    println!("{}", recs.summary);
    println!();

    for group in &recs.tier_bets {
        println!("=== {} bets ({}) ===", group.name, format_currency(group.total_cost));
        for bet in &group.bets {
            print_bet_line(bet);
        }
        println!();
    }

    let sections = [
        ("Nuclear longshots", &recs.special_bets.nuclear),
        ("Hidden value", &recs.special_bets.hidden_value),
        ("High EV", &recs.special_bets.high_ev),
    ];
    for (title, bets) in sections {
        if bets.is_empty() {
            continue;
        }
        println!("=== {} ===", title);
        for bet in bets {
            print_bet_line(bet);
        }
        println!();
    }
}

fn print_bet_line(bet: &crate::betting::GeneratedBet) {
    let mark = if bet.is_recommended { "*" } else { " " };
    println!(
        " {} {:<36} cost {:>9}  returns {} - {}",
        mark,
        bet.window_instruction,
        format_currency(bet.total_cost),
        format_currency(bet.potential_return.min),
        format_currency(bet.potential_return.max)
    );
}

fn print_budget(report: &BudgetReport) {
    println!("=== Budget ===");
    println!(
        "  {} of {} ({} remaining)",
        format_currency(report.total_cost),
        format_currency(report.budget),
        format_currency(report.remaining)
    );
    for usage in &report.tiers {
        println!(
            "  {}: {} of {}",
            usage.tier,
            format_currency(usage.spent),
            format_currency(usage.allocated)
        );
    }
    if report.is_over_budget {
        println!("  Over budget by {}", format_currency(report.overage));
    }
}
