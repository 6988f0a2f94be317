//! Bets outside the tiers: nuclear longshots, hidden value and high-EV overlays.

use crate::betting::{BetHorse, BetSection, BetType, GeneratedBet, SpecialCategory};
use crate::classifier::HorseAnalysis;
use crate::detectors::LongshotClass;
use crate::sizing::tier_budget;
use crate::types::{ProgramNumber, Tier};

use super::{BetSlate, SpecialAnalyses, TierView};

/// EV multiplier ceiling for high-EV stakes
const MAX_EV_MULTIPLIER: f64 = 2.0;

pub(super) fn generate(slate: &mut BetSlate<'_>, view: &TierView<'_>, specials: &SpecialAnalyses) {
    longshots(slate, view, specials);
    hidden_values(slate, view, specials);
    high_ev(slate, view);
}

fn find<'a>(field: &'a [HorseAnalysis], program: ProgramNumber) -> Option<&'a HorseAnalysis> {
    field.iter().find(|h| h.program_number == program)
}

fn bet_horse(horse: &HorseAnalysis, view: &TierView<'_>) -> BetHorse {
    BetHorse {
        tier: view.tier_of(horse.program_number),
        ..BetHorse::from(horse)
    }
}

fn longshots(slate: &mut BetSlate<'_>, view: &TierView<'_>, specials: &SpecialAnalyses) {
    for longshot in specials.longshots.iter().filter(|l| l.is_qualifying()) {
        if slate.covers(BetType::ValueBomb, longshot.program_number) {
            continue;
        }
        let Some(horse) = find(slate.ctx.field, longshot.program_number) else {
            continue;
        };

        let (stake, category) = match longshot.class {
            LongshotClass::Nuclear => (slate.ctx.betting.nuclear_stake, SpecialCategory::Nuclear),
            _ => (slate.ctx.betting.live_stake, SpecialCategory::ValueBomb),
        };
        let tier = view.tier_of(horse.program_number).unwrap_or(Tier::Tier3);

        slate.add(
            GeneratedBet::new(BetType::Win, vec![bet_horse(horse, view)], stake, tier, horse.confidence)
                .with_category(category)
                .in_section(BetSection::Nuclear)
                .explain(longshot.reasoning.clone()),
        );
    }
}

fn hidden_values(slate: &mut BetSlate<'_>, view: &TierView<'_>, specials: &SpecialAnalyses) {
    for hidden in &specials.hidden_values {
        let Some(horse) = find(slate.ctx.field, hidden.program_number) else {
            continue;
        };

        let tier = view.tier_of(horse.program_number).unwrap_or(Tier::Tier2);
        let stake = slate.unit(horse.confidence, Tier::Tier2);
        let place_stake = stake * slate.ctx.betting.hidden_value_place_ratio;

        slate.add(
            GeneratedBet::new(BetType::HiddenGem, vec![bet_horse(horse, view)], stake, tier, horse.confidence)
                .with_category(SpecialCategory::Diamond)
                .in_section(BetSection::HiddenValue)
                .explain(hidden.reasoning.clone()),
        );
        slate.add(
            GeneratedBet::new(BetType::Place, vec![bet_horse(horse, view)], place_stake, tier, horse.confidence)
                .with_category(SpecialCategory::Diamond)
                .in_section(BetSection::HiddenValue)
                .explain(format!("Place saver on hidden value #{}", horse.program_number)),
        );
    }
}

fn high_ev(slate: &mut BetSlate<'_>, view: &TierView<'_>) {
    let betting = slate.ctx.betting;
    let bankroll = slate.ctx.bankroll;
    let cap = if bankroll.bets_per_tier > 0 {
        tier_budget(Tier::Tier2, bankroll) / bankroll.bets_per_tier as f64
    } else {
        tier_budget(Tier::Tier2, bankroll)
    }
    .min(bankroll.max_bet);

    let field = slate.ctx.field;
    for horse in field {
        let overlay = &horse.overlay;
        if overlay.overlay_percent < betting.high_ev_min_overlay
            || horse.odds < betting.high_ev_min_odds
            || !overlay.is_positive_ev
        {
            continue;
        }
        // A value bomb or hidden gem already carries the win money on this horse
        if slate.covers(BetType::ValueBomb, horse.program_number)
            || slate.covers(BetType::HiddenGem, horse.program_number)
        {
            continue;
        }

        let unit = slate.unit(horse.confidence, Tier::Tier2);
        let multiplier = (1.0 + overlay.ev_per_dollar.max(0.0)).min(MAX_EV_MULTIPLIER);
        let stake = ((unit * multiplier).min(cap) * 100.0).round() / 100.0;
        let tier = view.tier_of(horse.program_number).unwrap_or(Tier::Tier2);

        slate.add(
            GeneratedBet::new(BetType::Win, vec![bet_horse(horse, view)], stake, tier, horse.confidence)
                .in_section(BetSection::HighEv)
                .explain(format!(
                    "{:+.0}% overlay at {}: {:+.2} expected per dollar",
                    overlay.overlay_percent, horse.odds_display, overlay.ev_per_dollar
                )),
        );
    }
}
