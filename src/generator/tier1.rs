//! Tier1 bets: the top contenders.

use crate::betting::{BetType, GeneratedBet};
use crate::box_selector::{select_box_horses, BoxSelectionConfig};
use crate::classifier::ClassifiedHorse;
use crate::types::{ProgramNumber, Tier};

use super::{snapshot, BetSlate, TierView};

/// Partners for the exacta key over
const KEY_PARTNERS: usize = 3;

pub(super) fn generate(slate: &mut BetSlate<'_>, view: &TierView<'_>) {
    let Some(top) = view.tier1.first() else {
        return;
    };

    let unit = slate.unit(top.confidence, Tier::Tier1);
    let exotic = slate.exotic_unit(top.confidence, Tier::Tier1);

    slate.add(
        GeneratedBet::new(BetType::Win, snapshot(&[top]), unit * 2.0, Tier::Tier1, top.confidence)
            .explain(format!(
                "Top contender at {} with a {:.0} adjusted score",
                top.odds_display, top.adjusted_score
            ))
            .explain(top.reasoning.clone()),
    );

    slate.add(
        GeneratedBet::new(BetType::Place, snapshot(&[top]), unit, Tier::Tier1, top.confidence)
            .explain(format!("Place hedge on #{} in case it's caught late", top.program_number)),
    );

    exacta_box(slate, view.tier1, exotic);

    let partners = view.best_excluding(&[top.program_number], KEY_PARTNERS);
    if !partners.is_empty() {
        let mut horses = vec![top];
        horses.extend(partners.iter().copied());
        slate.add(
            GeneratedBet::new(BetType::ExactaKeyOver, snapshot(&horses), exotic, Tier::Tier1, top.confidence)
                .explain(format!(
                    "#{} keyed on top of the next {} best",
                    top.program_number,
                    partners.len()
                )),
        );
    }

    trifecta(slate, view, exotic);
}

fn exacta_box(slate: &mut BetSlate<'_>, tier1: &[ClassifiedHorse], amount: f64) {
    let config = BoxSelectionConfig::from_features(slate.ctx.features, 2, 3);
    let selection = select_box_horses(tier1, &config);
    if !selection.is_valid_box {
        return;
    }

    let horses: Vec<&ClassifiedHorse> = selection.selected_horses.iter().collect();
    let confidence = horses.iter().map(|h| h.confidence).min().unwrap_or(0);
    let mut bet = GeneratedBet::new(BetType::ExactaBox, snapshot(&horses), amount, Tier::Tier1, confidence)
        .explain(format!("Tier1 exacta box: {}", selection.summary));
    for reason in selection.exclusion_reasons.values() {
        bet = bet.explain(format!("Left out: {}", reason));
    }
    slate.add(bet);
}

/// Trifecta box of the top tier1 horses, topped up from outside tier1 when
/// fewer than three make the box.
fn trifecta(slate: &mut BetSlate<'_>, view: &TierView<'_>, exotic: f64) {
    let config = BoxSelectionConfig::from_features(slate.ctx.features, 3, 3);
    let selection = select_box_horses(view.tier1, &config);

    let (horses, note): (Vec<&ClassifiedHorse>, String) = if selection.is_valid_box {
        (
            selection.selected_horses.iter().collect(),
            format!("Tier1 trifecta box: {}", selection.summary),
        )
    } else {
        let core: Vec<&ClassifiedHorse> = view.tier1.iter().take(2).collect();
        let taken: Vec<ProgramNumber> = view.tier1.iter().map(|h| h.program_number).collect();
        let outside = view.best_excluding(&taken, 3 - core.len());
        let note = format!(
            "Top {} tier1 with the best {} from outside tier1",
            core.len(),
            outside.len()
        );
        (core.into_iter().chain(outside).collect(), note)
    };

    if horses.len() < 3 {
        return;
    }

    let amount = (exotic / 2.0).round().max(slate.ctx.bankroll.min_bet);
    let confidence = horses.iter().map(|h| h.confidence).min().unwrap_or(0);
    slate.add(
        GeneratedBet::new(BetType::TrifectaBox, snapshot(&horses), amount, Tier::Tier1, confidence).explain(note),
    );
}
