//! Tier2 bets: value alternatives played with and against the chalk.

use crate::betting::{BetType, GeneratedBet};
use crate::box_selector::{select_box_horses, BoxSelectionConfig};
use crate::classifier::ClassifiedHorse;
use crate::types::Tier;

use super::{snapshot, BetSlate, TierView};

pub(super) fn generate(slate: &mut BetSlate<'_>, view: &TierView<'_>) {
    let Some(top) = view.tier2.first() else {
        return;
    };

    let unit = slate.unit(top.confidence, Tier::Tier2);
    let exotic = slate.exotic_unit(top.confidence, Tier::Tier2);

    let mut win = GeneratedBet::new(BetType::Win, snapshot(&[top]), unit, Tier::Tier2, top.confidence).explain(
        format!(
            "Value play at {} ({:+.0}% overlay, fair odds {})",
            top.odds_display,
            top.overlay_percent(),
            top.overlay.fair_odds
        ),
    );
    if let Some(special) = top.special_case {
        win = win.explain(format!("Flagged as {}", special.label()));
    }
    slate.add(win.explain(top.reasoning.clone()));

    if let Some(chalk) = view.tier1.first() {
        let confidence = top.confidence.min(chalk.confidence);

        slate.add(
            GeneratedBet::new(BetType::ExactaKeyOver, snapshot(&[top, chalk]), exotic, Tier::Tier2, confidence)
                .explain(format!(
                    "#{} to beat the favorite #{}",
                    top.program_number, chalk.program_number
                )),
        );
        slate.add(
            GeneratedBet::new(BetType::ExactaKeyUnder, snapshot(&[top, chalk]), exotic, Tier::Tier2, confidence)
                .explain(format!(
                    "#{} to run second behind #{}",
                    top.program_number, chalk.program_number
                )),
        );
        slate.add(
            GeneratedBet::new(BetType::Quinella, snapshot(&[top, chalk]), exotic, Tier::Tier2, confidence)
                .explain(format!(
                    "#{} and #{} to fill the exacta in either order",
                    top.program_number, chalk.program_number
                )),
        );
    }

    mixed_trifecta(slate, view, exotic);

    if top.overlay_percent() >= slate.ctx.betting.place_min_overlay {
        slate.add(
            GeneratedBet::new(BetType::Place, snapshot(&[top]), unit, Tier::Tier2, top.confidence).explain(format!(
                "Overlay of {:+.0}% is big enough to play underneath",
                top.overlay_percent()
            )),
        );
    }
}

/// Trifecta box across tier1 and tier2, kept only when a tier2 horse makes the box.
fn mixed_trifecta(slate: &mut BetSlate<'_>, view: &TierView<'_>, exotic: f64) {
    let mut candidates: Vec<ClassifiedHorse> = view.tier1.iter().chain(view.tier2).cloned().collect();
    candidates.sort_by(|a, b| {
        b.adjusted_score
            .total_cmp(&a.adjusted_score)
            .then_with(|| a.program_number.cmp(&b.program_number))
    });

    let config = BoxSelectionConfig::from_features(slate.ctx.features, 3, 4);
    let selection = select_box_horses(&candidates, &config);
    if !selection.is_valid_box || !selection.selected_horses.iter().any(|h| h.tier == Tier::Tier2) {
        return;
    }

    let horses: Vec<&ClassifiedHorse> = selection.selected_horses.iter().collect();
    let confidence = horses.iter().map(|h| h.confidence).min().unwrap_or(0);
    let amount = (exotic / 2.0).round().max(slate.ctx.bankroll.min_bet);
    slate.add(
        GeneratedBet::new(BetType::TrifectaBox, snapshot(&horses), amount, Tier::Tier2, confidence)
            .explain(format!("Tier1/tier2 trifecta box: {}", selection.summary)),
    );
}
