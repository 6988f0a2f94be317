//! Bet sizing and bankroll scaling.
//!
//! Stakes are sized per bet from confidence, tier and risk profile, then the
//! whole set is scaled down so no tier spends more than its share of the
//! race budget.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::betting::GeneratedBet;
use crate::config::{BankrollConfig, RiskProfile};
use crate::types::Tier;

/// Tolerance for budget comparisons
const BUDGET_EPSILON: f64 = 1e-6;

/// Stake multiplier by tier
pub fn tier_multiplier(tier: Tier) -> f64 {
    match tier {
        Tier::Tier1 => 1.5,
        Tier::Tier2 => 1.0,
        Tier::Tier3 => 0.5,
    }
}

/// Stake multiplier by risk profile
pub fn risk_multiplier(risk: RiskProfile) -> f64 {
    match risk {
        RiskProfile::Conservative => 0.75,
        RiskProfile::Moderate => 1.0,
        RiskProfile::Aggressive => 1.25,
    }
}

/// Stake multiplier by confidence
pub fn confidence_multiplier(confidence: u8) -> f64 {
    match confidence {
        85..=u8::MAX => 2.0,
        75..=84 => 1.5,
        65..=74 => 1.0,
        55..=64 => 0.75,
        _ => 0.5,
    }
}

/// Share of the race budget (percent) for tier1, tier2, tier3
pub fn tier_allocation(risk: RiskProfile) -> [f64; 3] {
    match risk {
        RiskProfile::Conservative => [70.0, 30.0, 0.0],
        RiskProfile::Moderate => [50.0, 30.0, 20.0],
        RiskProfile::Aggressive => [20.0, 30.0, 50.0],
    }
}

/// Dollar budget for one tier
pub fn tier_budget(tier: Tier, bankroll: &BankrollConfig) -> f64 {
    bankroll.race_budget * tier_allocation(bankroll.risk_profile)[tier.index()] / 100.0
}

/// Per-combination stake for a bet of `tier` at `confidence`.
///
/// base unit × tier × risk × confidence multipliers, capped at the tier's
/// per-bet share, clamped to `[min_bet, max_bet]` and rounded to whole dollars.
pub fn calculate_bet_amount(confidence: u8, tier: Tier, bankroll: &BankrollConfig) -> f64 {
    let raw = bankroll.base_unit
        * tier_multiplier(tier)
        * risk_multiplier(bankroll.risk_profile)
        * confidence_multiplier(confidence);

    let cap = if bankroll.bets_per_tier > 0 {
        tier_budget(tier, bankroll) / bankroll.bets_per_tier as f64
    } else {
        tier_budget(tier, bankroll)
    };

    let amount = raw.min(cap).max(bankroll.min_bet).min(bankroll.max_bet).round();
    if !raw.is_finite() || !amount.is_finite() {
        warn!(
            "Non-finite bet amount for {} at confidence {}, using min bet {}",
            tier, confidence, bankroll.min_bet
        );
        return bankroll.min_bet;
    }

    amount
}

/// Stake from confidence alone: 1 unit at 50 up to `max_units` at 100.
///
/// `calculate_bet_size(100.0, 10.0, 5) == 50.0`, `calculate_bet_size(50.0, 10.0, 5) == 10.0`.
pub fn calculate_bet_size(confidence: f64, base_unit: f64, max_units: u32) -> f64 {
    if !confidence.is_finite() || !base_unit.is_finite() {
        return base_unit.max(0.0);
    }

    let span = (confidence.clamp(50.0, 100.0) - 50.0) / 50.0;
    let units = (1.0 + span * (max_units.max(1) - 1) as f64).round();
    (units * base_unit).max(base_unit)
}

fn floor_cents(amount: f64) -> f64 {
    ((amount * 100.0) + BUDGET_EPSILON).floor() / 100.0
}

fn tier_spend(bets: &[GeneratedBet], tier: Tier) -> f64 {
    bets.iter().filter(|b| b.tier == tier).map(|b| b.total_cost).sum()
}

/// Scale every tier down to its budget share. Never scales up.
///
/// Amounts are floored to cents and cost and payout are recomputed from the
/// new amount, so applying this twice gives the same result as once.
pub fn scale_bets_by_bankroll(bets: Vec<GeneratedBet>, bankroll: &BankrollConfig) -> Vec<GeneratedBet> {
    let factors: Vec<f64> = Tier::ALL
        .iter()
        .map(|tier| {
            let current = tier_spend(&bets, *tier);
            let allocated = tier_budget(*tier, bankroll);
            if current <= allocated + BUDGET_EPSILON || current <= 0.0 {
                1.0
            } else {
                debug!(
                    "{} spend {:.2} over allocation {:.2}, scaling by {:.3}",
                    tier,
                    current,
                    allocated,
                    allocated / current
                );
                (allocated / current).clamp(0.0, 1.0)
            }
        })
        .collect();

    bets.into_iter()
        .map(|mut bet| {
            let factor = factors[bet.tier.index()];
            if factor < 1.0 {
                bet.set_amount(floor_cents(bet.amount * factor));
            }
            bet
        })
        .collect()
}

/// Budget usage of one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBudgetUsage {
    pub tier: Tier,
    pub allocated: f64,
    pub spent: f64,
    pub over_by: f64,
}

/// Spend of a bet set against the race budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub budget: f64,
    pub total_cost: f64,
    pub remaining: f64,
    pub is_over_budget: bool,
    pub overage: f64,
    pub tiers: Vec<TierBudgetUsage>,
}

/// Compare a bet set with the race budget and each tier's allocation.
pub fn validate_budget(bets: &[GeneratedBet], bankroll: &BankrollConfig) -> BudgetReport {
    let total_cost: f64 = bets.iter().map(|b| b.total_cost).sum();
    let budget = bankroll.race_budget;

    let tiers = Tier::ALL
        .iter()
        .map(|tier| {
            let allocated = tier_budget(*tier, bankroll);
            let spent = tier_spend(bets, *tier);
            TierBudgetUsage {
                tier: *tier,
                allocated,
                spent,
                over_by: (spent - allocated).max(0.0),
            }
        })
        .collect();

    BudgetReport {
        budget,
        total_cost,
        remaining: (budget - total_cost).max(0.0),
        is_over_budget: total_cost > budget + BUDGET_EPSILON,
        overage: (total_cost - budget).max(0.0),
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::{BetHorse, BetType};
    use crate::types::ProgramNumber;

    fn bet(bet_type: BetType, programs: &[u32], amount: f64, tier: Tier) -> GeneratedBet {
        let horses = programs
            .iter()
            .map(|p| BetHorse {
                program_number: ProgramNumber(*p),
                name: format!("Horse {}", p),
                odds: 4.0,
                odds_display: "4-1".to_string(),
                adjusted_score: 170.0,
                overlay_percent: 10.0,
                confidence: 70,
                tier: Some(tier),
            })
            .collect();
        GeneratedBet::new(bet_type, horses, amount, tier, 70)
    }

    #[test]
    fn test_calculate_bet_size() {
        assert_eq!(calculate_bet_size(100.0, 10.0, 5), 50.0);
        assert_eq!(calculate_bet_size(50.0, 10.0, 5), 10.0);
        assert_eq!(calculate_bet_size(20.0, 10.0, 5), 10.0);
        assert_eq!(calculate_bet_size(75.0, 10.0, 5), 30.0);
    }

    #[test]
    fn test_bet_amount_multipliers() {
        let bankroll = BankrollConfig {
            race_budget: 1000.0,
            ..BankrollConfig::default()
        };
        // 2 * 1.5 * 1.0 * 2.0 = 6
        assert_eq!(calculate_bet_amount(90, Tier::Tier1, &bankroll), 6.0);
        // 2 * 0.5 * 1.0 * 0.5 = 0.5 -> min bet 1
        assert_eq!(calculate_bet_amount(50, Tier::Tier3, &bankroll), 1.0);
    }

    #[test]
    fn test_bet_amount_capped_by_tier_share() {
        let bankroll = BankrollConfig {
            race_budget: 20.0,
            base_unit: 10.0,
            ..BankrollConfig::default()
        };
        // tier1 share = 10, 4 bets -> 2.5 per bet, rounds to 3
        assert_eq!(calculate_bet_amount(90, Tier::Tier1, &bankroll), 3.0);
    }

    #[test]
    fn test_bet_amount_non_finite_falls_back() {
        let bankroll = BankrollConfig {
            base_unit: f64::NAN,
            ..BankrollConfig::default()
        };
        assert_eq!(calculate_bet_amount(80, Tier::Tier2, &bankroll), bankroll.min_bet);
    }

    #[test]
    fn test_allocations_sum_to_100() {
        for risk in [RiskProfile::Conservative, RiskProfile::Moderate, RiskProfile::Aggressive] {
            let total: f64 = tier_allocation(risk).iter().sum();
            assert_eq!(total, 100.0);
        }
    }

    #[test]
    fn test_scaling_small_budget() {
        // $20 budget, moderate: tier1 share is $10
        let bankroll = BankrollConfig {
            race_budget: 20.0,
            ..BankrollConfig::default()
        };
        let bets = vec![
            bet(BetType::Win, &[1], 10.0, Tier::Tier1),
            bet(BetType::ExactaBox, &[1, 2, 3], 2.0, Tier::Tier1),
        ];

        let scaled = scale_bets_by_bankroll(bets, &bankroll);
        let spent: f64 = scaled.iter().map(|b| b.total_cost).sum();
        assert!(spent <= 10.0 + 1e-6);

        for b in &scaled {
            assert!((b.total_cost - b.amount * b.combinations() as f64).abs() < 1e-9);
            assert_eq!(b.amount, (b.amount * 100.0).round() / 100.0);
        }
    }

    #[test]
    fn test_scaling_never_scales_up() {
        let bankroll = BankrollConfig {
            race_budget: 1000.0,
            ..BankrollConfig::default()
        };
        let bets = vec![bet(BetType::Win, &[1], 4.0, Tier::Tier1)];
        let scaled = scale_bets_by_bankroll(bets.clone(), &bankroll);
        assert_eq!(scaled, bets);
    }

    #[test]
    fn test_scaling_is_idempotent() {
        let bankroll = BankrollConfig {
            race_budget: 17.0,
            ..BankrollConfig::default()
        };
        let bets = vec![
            bet(BetType::Win, &[1], 7.0, Tier::Tier1),
            bet(BetType::TrifectaBox, &[1, 2, 3], 1.0, Tier::Tier1),
            bet(BetType::Quinella, &[2, 4], 3.0, Tier::Tier2),
            bet(BetType::Place, &[6], 5.0, Tier::Tier3),
        ];

        let once = scale_bets_by_bankroll(bets, &bankroll);
        let twice = scale_bets_by_bankroll(once.clone(), &bankroll);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_budget_monotonicity() {
        let bets = vec![
            bet(BetType::Win, &[1], 12.0, Tier::Tier1),
            bet(BetType::ExactaBox, &[1, 2], 4.0, Tier::Tier1),
            bet(BetType::Win, &[4], 6.0, Tier::Tier2),
            bet(BetType::Place, &[6], 4.0, Tier::Tier3),
        ];

        for risk in [RiskProfile::Conservative, RiskProfile::Moderate, RiskProfile::Aggressive] {
            for budget in [5.0, 13.0, 20.0, 37.5, 100.0] {
                let bankroll = BankrollConfig {
                    race_budget: budget,
                    risk_profile: risk,
                    ..BankrollConfig::default()
                };
                let scaled = scale_bets_by_bankroll(bets.clone(), &bankroll);
                let report = validate_budget(&scaled, &bankroll);

                assert!(!report.is_over_budget, "budget {} {:?}", budget, risk);
                for usage in &report.tiers {
                    assert!(usage.spent <= usage.allocated + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_validate_budget_reports_overage() {
        let bankroll = BankrollConfig {
            race_budget: 10.0,
            ..BankrollConfig::default()
        };
        let bets = vec![bet(BetType::Win, &[1], 8.0, Tier::Tier1), bet(BetType::Win, &[2], 4.0, Tier::Tier2)];
        let report = validate_budget(&bets, &bankroll);

        assert!(report.is_over_budget);
        assert_eq!(report.overage, 2.0);
        assert_eq!(report.remaining, 0.0);
        assert_eq!(report.tiers[0].over_by, 3.0);
        assert_eq!(report.tiers[1].over_by, 1.0);
    }
}
