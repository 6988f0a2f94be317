//! Post-generation passes, applied in a fixed order:
//! dedup -> scale to budget -> mark recommended -> sanitize -> narrate.

use std::collections::HashSet;
use tracing::debug;

use crate::betting::GeneratedBet;
use crate::config::{BankrollConfig, RiskProfile};
use crate::sizing::scale_bets_by_bankroll;
use crate::types::Tier;

use super::explain::narrate;

pub(super) fn run(bets: Vec<GeneratedBet>, bankroll: &BankrollConfig) -> Vec<GeneratedBet> {
    let bets = dedup_bets(bets);
    let bets = scale_bets_by_bankroll(bets, bankroll);
    let bets = mark_recommended(bets, bankroll.risk_profile);
    let mut bets = sanitize_bets(bets);
    for bet in &mut bets {
        narrate(bet);
    }
    bets
}

/// Drop bets with the same type and horse set. The first one wins.
pub fn dedup_bets(bets: Vec<GeneratedBet>) -> Vec<GeneratedBet> {
    let mut seen = HashSet::new();
    bets.into_iter()
        .filter(|bet| {
            let fresh = seen.insert(bet.dedup_key());
            if !fresh {
                debug!("Dropped duplicate {}: {}", bet.bet_type.label(), bet.window_instruction);
            }
            fresh
        })
        .collect()
}

/// Flag the bets worth playing for the risk profile.
pub fn mark_recommended(bets: Vec<GeneratedBet>, risk: RiskProfile) -> Vec<GeneratedBet> {
    bets.into_iter()
        .map(|mut bet| {
            let positive = bet.is_positive_ev();
            bet.is_recommended = match (risk, bet.tier) {
                (RiskProfile::Conservative, Tier::Tier1) => true,
                (RiskProfile::Conservative, Tier::Tier2) => positive,
                (RiskProfile::Conservative, Tier::Tier3) => false,
                (RiskProfile::Moderate, Tier::Tier3) => positive,
                (RiskProfile::Moderate, _) => true,
                (RiskProfile::Aggressive, _) => true,
            };
            bet
        })
        .collect()
}

/// Remove bets with no stake or non-finite numbers.
pub fn sanitize_bets(bets: Vec<GeneratedBet>) -> Vec<GeneratedBet> {
    bets.into_iter()
        .filter(|bet| {
            let ok = bet.is_valid()
                && bet.potential_return.min.is_finite()
                && bet.potential_return.max.is_finite()
                && bet.hit_probability.is_finite();
            if !ok {
                debug!(
                    "Dropped {} with amount {} and cost {}",
                    bet.bet_type.label(),
                    bet.amount,
                    bet.total_cost
                );
            }
            ok
        })
        .collect()
}
