//! Bet model: bet types, combination costs, payout ranges and hit chances.

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifiedHorse, HorseAnalysis};
use crate::harville::{box_probability, ordered_probability, top_n_probability, WinProbs};
use crate::types::{ProgramNumber, Tier};
use crate::window::window_instruction;

/// Flat superfecta box combination table (horses -> combinations)
pub const SUPERFECTA_BOX_TABLE: [(usize, u32); 4] = [(4, 24), (5, 120), (6, 360), (7, 840)];

/// Share of the odds product an exotic is expected to return, per position count
const EXOTIC_PAYOUT_FACTOR: [f64; 5] = [1.0, 1.0, 0.5, 0.35, 0.25];

/// Place payout range as a share of the win odds
const PLACE_FACTOR: (f64, f64) = (0.3, 0.5);

/// Show payout range as a share of the win odds
const SHOW_FACTOR: (f64, f64) = (0.15, 0.3);

/// Wager type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Win,
    Place,
    Show,
    ExactaBox,
    /// First horse wins, any partner second
    ExactaKeyOver,
    /// Any partner wins, first horse second
    ExactaKeyUnder,
    TrifectaBox,
    /// First horse wins, partners fill second and third
    TrifectaWheel,
    Quinella,
    Superfecta,
    /// Win bet on a detector-flagged longshot
    ValueBomb,
    /// Win leg of a hidden value pair
    HiddenGem,
}

impl BetType {
    pub fn name(&self) -> &'static str {
        match self {
            BetType::Win => "win",
            BetType::Place => "place",
            BetType::Show => "show",
            BetType::ExactaBox => "exacta_box",
            BetType::ExactaKeyOver => "exacta_key_over",
            BetType::ExactaKeyUnder => "exacta_key_under",
            BetType::TrifectaBox => "trifecta_box",
            BetType::TrifectaWheel => "trifecta_wheel",
            BetType::Quinella => "quinella",
            BetType::Superfecta => "superfecta",
            BetType::ValueBomb => "value_bomb",
            BetType::HiddenGem => "hidden_gem",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BetType::Win => "Win",
            BetType::Place => "Place",
            BetType::Show => "Show",
            BetType::ExactaBox => "Exacta Box",
            BetType::ExactaKeyOver => "Exacta Key",
            BetType::ExactaKeyUnder => "Exacta Key (under)",
            BetType::TrifectaBox => "Trifecta Box",
            BetType::TrifectaWheel => "Trifecta Wheel",
            BetType::Quinella => "Quinella",
            BetType::Superfecta => "Superfecta Box",
            BetType::ValueBomb => "Value Bomb",
            BetType::HiddenGem => "Hidden Gem",
        }
    }

    /// Finishing positions the bet covers
    pub fn positions(&self) -> usize {
        match self {
            BetType::Win | BetType::Place | BetType::Show | BetType::ValueBomb | BetType::HiddenGem => 1,
            BetType::ExactaBox | BetType::ExactaKeyOver | BetType::ExactaKeyUnder | BetType::Quinella => 2,
            BetType::TrifectaBox | BetType::TrifectaWheel => 3,
            BetType::Superfecta => 4,
        }
    }

    /// Fewest horses the bet can be built from
    pub fn min_horses(&self) -> usize {
        match self {
            BetType::ExactaKeyOver | BetType::ExactaKeyUnder => 2,
            _ => self.positions(),
        }
    }

    /// Straight single-horse bets
    pub fn is_straight(&self) -> bool {
        self.positions() == 1
    }

    /// Exacta-family and quinella bets
    pub fn is_two_horse(&self) -> bool {
        self.positions() == 2
    }

    /// Number of combinations for `n` horses.
    pub fn combinations(&self, n: usize) -> u32 {
        if n < self.min_horses() {
            return 0;
        }

        match self {
            BetType::Win | BetType::Place | BetType::Show | BetType::ValueBomb | BetType::HiddenGem => 1,
            BetType::ExactaBox | BetType::TrifectaBox => permutation_count(n, self.positions()),
            BetType::ExactaKeyOver | BetType::ExactaKeyUnder => (n - 1) as u32,
            BetType::TrifectaWheel => ((n - 1) * (n - 2)) as u32,
            BetType::Quinella => (n * (n - 1) / 2) as u32,
            BetType::Superfecta => SUPERFECTA_BOX_TABLE
                .iter()
                .find(|(horses, _)| *horses == n)
                .map(|(_, combos)| *combos)
                .unwrap_or_else(|| permutation_count(n, 4)),
        }
    }
}

/// n * (n-1) * ... * (n-k+1)
pub fn permutation_count(n: usize, k: usize) -> u32 {
    if k > n {
        return 0;
    }
    (0..k).map(|i| (n - i) as u32).product()
}

/// Total cost of a bet: per-combination amount times the combination count.
pub fn calculate_total_cost(bet_type: BetType, amount: f64, horses: usize) -> f64 {
    amount * bet_type.combinations(horses) as f64
}

/// Cross-cutting category a bet was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialCategory {
    Nuclear,
    Diamond,
    ValueBomb,
}

/// Section of the recommendations a bet is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetSection {
    #[default]
    Tier,
    Nuclear,
    HiddenValue,
    HighEv,
}

/// Payout range for a winning ticket
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PotentialReturn {
    pub min: f64,
    pub max: f64,
}

impl PotentialReturn {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Estimate the payout range from the odds of the included horses.
///
/// `odds` follows the bet's horse order; for key and wheel bets the first
/// entry is the key horse.
pub fn estimate_potential_return(bet_type: BetType, amount: f64, odds: &[f64]) -> PotentialReturn {
    if odds.is_empty() || amount <= 0.0 {
        return PotentialReturn::default();
    }

    let (lo, hi) = odds_range(odds);
    match bet_type {
        BetType::Win | BetType::ValueBomb | BetType::HiddenGem => PotentialReturn {
            min: amount * (lo + 1.0),
            max: amount * (hi + 1.0),
        },
        BetType::Place => PotentialReturn {
            min: amount * (1.0 + lo * PLACE_FACTOR.0),
            max: amount * (1.0 + hi * PLACE_FACTOR.1),
        },
        BetType::Show => PotentialReturn {
            min: amount * (1.0 + lo * SHOW_FACTOR.0),
            max: amount * (1.0 + hi * SHOW_FACTOR.1),
        },
        _ => {
            let k = bet_type.positions();
            let factor = EXOTIC_PAYOUT_FACTOR[k.min(EXOTIC_PAYOUT_FACTOR.len() - 1)]
                * if bet_type == BetType::Quinella { 0.5 } else { 1.0 };

            let (fixed, pool) = match bet_type {
                BetType::ExactaKeyOver | BetType::ExactaKeyUnder | BetType::TrifectaWheel => {
                    (vec![odds[0]], odds[1..].to_vec())
                }
                _ => (Vec::new(), odds.to_vec()),
            };

            let mut asc = pool.clone();
            asc.sort_by(|a, b| a.total_cmp(b));
            let mut desc = pool;
            desc.sort_by(|a, b| b.total_cmp(a));

            let take = k.saturating_sub(fixed.len());
            let product = |picked: &[f64]| -> f64 {
                fixed
                    .iter()
                    .chain(picked.iter().take(take))
                    .map(|o| o + 1.0)
                    .product::<f64>()
            };

            PotentialReturn {
                min: amount * product(&asc) * factor,
                max: amount * product(&desc) * factor,
            }
        }
    }
}

fn odds_range(odds: &[f64]) -> (f64, f64) {
    let lo = odds.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = odds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

/// Hit probability of a bet given field win probabilities.
pub fn hit_probability(bet_type: BetType, horses: &[ProgramNumber], win_probs: &WinProbs) -> f64 {
    if horses.len() < bet_type.min_horses() {
        return 0.0;
    }

    let key = horses[0];
    let partners = &horses[1..];

    match bet_type {
        BetType::Win | BetType::ValueBomb | BetType::HiddenGem => top_n_probability(key, 1, win_probs),
        BetType::Place => top_n_probability(key, 2, win_probs),
        BetType::Show => top_n_probability(key, 3, win_probs),
        BetType::ExactaBox | BetType::TrifectaBox | BetType::Superfecta => {
            box_probability(horses, bet_type.positions(), win_probs)
        }
        BetType::Quinella => box_probability(horses, 2, win_probs),
        BetType::ExactaKeyOver => partners
            .iter()
            .map(|p| ordered_probability(&[key, *p], win_probs))
            .sum(),
        BetType::ExactaKeyUnder => partners
            .iter()
            .map(|p| ordered_probability(&[*p, key], win_probs))
            .sum(),
        BetType::TrifectaWheel => {
            let mut total = 0.0;
            for a in partners {
                for b in partners {
                    if a != b {
                        total += ordered_probability(&[key, *a, *b], win_probs);
                    }
                }
            }
            total
        }
    }
}

/// Snapshot of a horse as it appears on a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetHorse {
    pub program_number: ProgramNumber,
    pub name: String,
    pub odds: f64,
    pub odds_display: String,
    pub adjusted_score: f64,
    pub overlay_percent: f64,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl From<&ClassifiedHorse> for BetHorse {
    fn from(horse: &ClassifiedHorse) -> Self {
        Self {
            program_number: horse.program_number,
            name: horse.name.clone(),
            odds: horse.odds,
            odds_display: horse.odds_display.clone(),
            adjusted_score: horse.adjusted_score,
            overlay_percent: horse.overlay.overlay_percent,
            confidence: horse.confidence,
            tier: Some(horse.tier),
        }
    }
}

impl From<&HorseAnalysis> for BetHorse {
    fn from(analysis: &HorseAnalysis) -> Self {
        Self {
            program_number: analysis.program_number,
            name: analysis.name.clone(),
            odds: analysis.odds,
            odds_display: analysis.odds_display.clone(),
            adjusted_score: analysis.adjusted_score(),
            overlay_percent: analysis.overlay.overlay_percent,
            confidence: analysis.confidence,
            tier: None,
        }
    }
}

/// A concrete, sized wager recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBet {
    pub bet_type: BetType,
    /// Key horse first for key and wheel bets
    pub horses: Vec<BetHorse>,
    /// Stake per combination
    pub amount: f64,
    pub total_cost: f64,
    pub potential_return: PotentialReturn,
    pub hit_probability: f64,
    pub confidence: u8,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_category: Option<SpecialCategory>,
    #[serde(default)]
    pub section: BetSection,
    pub explanation: Vec<String>,
    pub narrative: String,
    pub is_recommended: bool,
    pub window_instruction: String,
}

impl GeneratedBet {
    pub fn new(bet_type: BetType, horses: Vec<BetHorse>, amount: f64, tier: Tier, confidence: u8) -> Self {
        let mut bet = Self {
            bet_type,
            horses,
            amount: 0.0,
            total_cost: 0.0,
            potential_return: PotentialReturn::default(),
            hit_probability: 0.0,
            confidence,
            tier,
            special_category: None,
            section: BetSection::Tier,
            explanation: Vec::new(),
            narrative: String::new(),
            is_recommended: false,
            window_instruction: String::new(),
        };
        bet.set_amount(amount);
        bet
    }

    pub fn with_category(mut self, category: SpecialCategory) -> Self {
        self.special_category = Some(category);
        self
    }

    pub fn in_section(mut self, section: BetSection) -> Self {
        self.section = section;
        self
    }

    /// Append an explanation line. Blank lines are ignored.
    pub fn explain(mut self, line: impl Into<String>) -> Self {
        let line = line.into();
        if !line.trim().is_empty() {
            self.explanation.push(line);
        }
        self
    }

    /// Change the per-combination stake, recomputing cost, payout and ticket text.
    pub fn set_amount(&mut self, amount: f64) {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        self.amount = amount;
        self.total_cost = (calculate_total_cost(self.bet_type, amount, self.horses.len()) * 100.0).round() / 100.0;
        let odds: Vec<f64> = self.horses.iter().map(|h| h.odds).collect();
        self.potential_return = estimate_potential_return(self.bet_type, amount, &odds);
        self.window_instruction = window_instruction(self.bet_type, &self.program_numbers(), amount);
    }

    /// Program numbers in ticket order
    pub fn program_numbers(&self) -> Vec<ProgramNumber> {
        self.horses.iter().map(|h| h.program_number).collect()
    }

    /// Identity used for deduplication: type plus the sorted horse set.
    pub fn dedup_key(&self) -> (BetType, Vec<ProgramNumber>) {
        let mut programs = self.program_numbers();
        programs.sort();
        programs.dedup();
        (self.bet_type, programs)
    }

    pub fn combinations(&self) -> u32 {
        self.bet_type.combinations(self.horses.len())
    }

    /// Expected profit of the ticket at the midpoint payout.
    pub fn expected_value(&self) -> f64 {
        self.hit_probability * self.potential_return.midpoint() - self.total_cost
    }

    pub fn is_positive_ev(&self) -> bool {
        self.expected_value() > 0.0
    }

    /// Bet stands: finite, positive stake and cost
    pub fn is_valid(&self) -> bool {
        self.amount.is_finite() && self.total_cost.is_finite() && self.amount > 0.0 && self.total_cost > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bet_horse(program: u32, odds: f64) -> BetHorse {
        BetHorse {
            program_number: ProgramNumber(program),
            name: format!("Horse {}", program),
            odds,
            odds_display: crate::odds::format_odds(odds),
            adjusted_score: 180.0,
            overlay_percent: 0.0,
            confidence: 70,
            tier: Some(Tier::Tier1),
        }
    }

    #[test]
    fn test_box_combinations_are_permutations() {
        assert_eq!(BetType::ExactaBox.combinations(2), 2);
        assert_eq!(BetType::ExactaBox.combinations(3), 6);
        assert_eq!(BetType::TrifectaBox.combinations(3), 6);
        assert_eq!(BetType::TrifectaBox.combinations(4), 24);
    }

    #[test]
    fn test_key_and_wheel_combinations() {
        assert_eq!(BetType::ExactaKeyOver.combinations(4), 3);
        assert_eq!(BetType::ExactaKeyUnder.combinations(2), 1);
        assert_eq!(BetType::TrifectaWheel.combinations(4), 6);
        assert_eq!(BetType::Quinella.combinations(2), 1);
        assert_eq!(BetType::Quinella.combinations(4), 6);
    }

    #[test]
    fn test_superfecta_table() {
        assert_eq!(BetType::Superfecta.combinations(4), 24);
        assert_eq!(BetType::Superfecta.combinations(6), 360);
        assert_eq!(BetType::Superfecta.combinations(8), 1680);
        assert_eq!(BetType::Superfecta.combinations(3), 0);
    }

    #[test]
    fn test_too_few_horses_costs_nothing() {
        assert_eq!(calculate_total_cost(BetType::TrifectaBox, 1.0, 2), 0.0);
        assert_eq!(calculate_total_cost(BetType::Win, 5.0, 0), 0.0);
        assert_eq!(calculate_total_cost(BetType::ExactaBox, 2.0, 3), 12.0);
    }

    #[test]
    fn test_win_return() {
        let ret = estimate_potential_return(BetType::Win, 10.0, &[3.0]);
        assert_eq!(ret.min, 40.0);
        assert_eq!(ret.max, 40.0);
    }

    #[test]
    fn test_box_return_uses_odds_range() {
        let ret = estimate_potential_return(BetType::ExactaBox, 1.0, &[2.0, 5.0, 9.0]);
        // min: (2+1)(5+1)*0.5 = 9, max: (9+1)(5+1)*0.5 = 30
        assert!((ret.min - 9.0).abs() < 1e-9);
        assert!((ret.max - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_key_return_keeps_key_fixed() {
        let ret = estimate_potential_return(BetType::ExactaKeyOver, 2.0, &[4.0, 1.0, 10.0]);
        // min: 2 * (5 * 2) * 0.5 = 10, max: 2 * (5 * 11) * 0.5 = 55
        assert!((ret.min - 10.0).abs() < 1e-9);
        assert!((ret.max - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_returns_are_ordered() {
        let odds = [1.5, 3.0, 8.0, 20.0];
        for bet_type in [
            BetType::Place,
            BetType::Show,
            BetType::ExactaBox,
            BetType::TrifectaBox,
            BetType::TrifectaWheel,
            BetType::Quinella,
            BetType::Superfecta,
        ] {
            let ret = estimate_potential_return(bet_type, 1.0, &odds);
            assert!(ret.min <= ret.max, "{:?}", bet_type);
            assert!(ret.min > 0.0);
        }
    }

    #[test]
    fn test_set_amount_recomputes() {
        let mut bet = GeneratedBet::new(
            BetType::ExactaBox,
            vec![bet_horse(3, 2.0), bet_horse(5, 4.0)],
            5.0,
            Tier::Tier1,
            80,
        );
        assert_eq!(bet.total_cost, 10.0);
        assert_eq!(bet.window_instruction, "$5 EXACTA BOX 3-5");

        let before = bet.potential_return;
        bet.set_amount(2.5);
        assert_eq!(bet.total_cost, 5.0);
        assert!((bet.potential_return.max - before.max / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_cost_is_whole_cents() {
        let horses = vec![bet_horse(1, 2.0), bet_horse(2, 3.0), bet_horse(3, 6.0), bet_horse(4, 9.0)];
        let bet = GeneratedBet::new(BetType::Superfecta, horses, 0.1, Tier::Tier3, 60);

        // 0.1 * 24 is 2.4000000000000004 in floating point
        assert_eq!(bet.total_cost, 2.4);
        assert_eq!(bet.combinations(), 24);
    }

    #[test]
    fn test_dedup_key_ignores_order() {
        let a = GeneratedBet::new(BetType::Quinella, vec![bet_horse(5, 2.0), bet_horse(3, 4.0)], 2.0, Tier::Tier2, 70);
        let b = GeneratedBet::new(BetType::Quinella, vec![bet_horse(3, 4.0), bet_horse(5, 2.0)], 2.0, Tier::Tier2, 70);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_hit_probability_key_bets() {
        let mut win_probs = HashMap::new();
        win_probs.insert(ProgramNumber(1), 0.5);
        win_probs.insert(ProgramNumber(2), 0.3);
        win_probs.insert(ProgramNumber(3), 0.2);

        let all = [ProgramNumber(1), ProgramNumber(2), ProgramNumber(3)];
        let over = hit_probability(BetType::ExactaKeyOver, &all, &win_probs);
        // Horse 1 wins with anyone second
        assert!((over - 0.5).abs() < 0.001);

        let wheel = hit_probability(BetType::TrifectaWheel, &all, &win_probs);
        assert!((wheel - 0.5).abs() < 0.001);

        assert_eq!(hit_probability(BetType::TrifectaBox, &all[..2], &win_probs), 0.0);
    }

    #[test]
    fn test_invalid_bets() {
        let bet = GeneratedBet::new(BetType::Win, vec![bet_horse(1, 3.0)], 0.0, Tier::Tier1, 80);
        assert!(!bet.is_valid());

        let bet = GeneratedBet::new(BetType::Win, vec![bet_horse(1, 3.0)], f64::NAN, Tier::Tier1, 80);
        assert!(!bet.is_valid());
    }
}
