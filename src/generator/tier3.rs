//! Tier3 bets: small stakes on overlaid longshots.

use crate::betting::{BetType, GeneratedBet, SpecialCategory};
use crate::classifier::ClassifiedHorse;
use crate::detectors::LongshotClass;
use crate::types::Tier;

use super::{snapshot, BetSlate, SpecialAnalyses, TierView};

/// Contenders used underneath the lead longshot
const UNDERNEATH: usize = 3;

/// Place stake relative to the win stake
const PLACE_RATIO: f64 = 1.5;

/// Superfecta stake relative to the straight unit
const SUPERFECTA_RATIO: f64 = 0.1;

pub(super) fn generate(slate: &mut BetSlate<'_>, view: &TierView<'_>, specials: &SpecialAnalyses) {
    let longshots: Vec<&ClassifiedHorse> = view.tier3.iter().take(slate.ctx.betting.max_longshots).collect();
    let Some(lead) = longshots.first().copied() else {
        return;
    };

    for horse in &longshots {
        straight(slate, horse, specials);
    }

    let unit = slate.unit(lead.confidence, Tier::Tier3);
    let contenders = view.best_excluding(&[lead.program_number], UNDERNEATH);
    if contenders.is_empty() {
        return;
    }

    let mut horses = vec![lead];
    horses.extend(contenders.iter().copied());
    let confidence = lead.confidence;
    let exotic = slate.exotic_unit(lead.confidence, Tier::Tier3);

    slate.add(
        GeneratedBet::new(BetType::ExactaKeyOver, snapshot(&horses), exotic, Tier::Tier3, confidence).explain(
            format!(
                "#{} at {} keyed over the top {} contenders",
                lead.program_number,
                lead.odds_display,
                contenders.len()
            ),
        ),
    );

    if slate.ctx.active_runners() >= slate.ctx.betting.superfecta_min_field && horses.len() == 4 {
        let amount = ((unit * SUPERFECTA_RATIO * 100.0).round() / 100.0).max(slate.ctx.betting.superfecta_min_stake);
        slate.add(
            GeneratedBet::new(BetType::Superfecta, snapshot(&horses), amount, Tier::Tier3, confidence).explain(
                format!(
                    "{} runners: superfecta box with #{} and the top contenders",
                    slate.ctx.active_runners(),
                    lead.program_number
                ),
            ),
        );
    }

    let amount = (exotic / 2.0).round().max(slate.ctx.bankroll.min_bet);
    slate.add(
        GeneratedBet::new(BetType::TrifectaWheel, snapshot(&horses), amount, Tier::Tier3, confidence).explain(
            format!("#{} on top, wheeled with the top contenders", lead.program_number),
        ),
    );
}

/// Value bomb for a flagged longshot, otherwise a win and place pair.
fn straight(slate: &mut BetSlate<'_>, horse: &ClassifiedHorse, specials: &SpecialAnalyses) {
    let unit = slate.unit(horse.confidence, Tier::Tier3);

    if let Some(longshot) = specials.longshot(horse.program_number) {
        let multiplier = match longshot.class {
            LongshotClass::Nuclear => 1.5,
            _ => 1.0,
        };
        slate.add(
            GeneratedBet::new(
                BetType::ValueBomb,
                snapshot(&[horse]),
                unit * multiplier,
                Tier::Tier3,
                horse.confidence,
            )
            .with_category(SpecialCategory::ValueBomb)
            .explain(longshot.reasoning.clone()),
        );
        return;
    }

    slate.add(
        GeneratedBet::new(BetType::Win, snapshot(&[horse]), unit, Tier::Tier3, horse.confidence).explain(format!(
            "Longshot at {} with a {:+.0}% overlay",
            horse.odds_display,
            horse.overlay_percent()
        )),
    );
    slate.add(
        GeneratedBet::new(
            BetType::Place,
            snapshot(&[horse]),
            unit * PLACE_RATIO,
            Tier::Tier3,
            horse.confidence,
        )
        .explain(format!("Place cover on #{}", horse.program_number)),
    );
}
