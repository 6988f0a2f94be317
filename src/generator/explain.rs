//! Plain-language narrative for a finished bet.

use crate::betting::{BetType, GeneratedBet, SpecialCategory};
use crate::window::format_currency;

fn names(bet: &GeneratedBet) -> String {
    bet.horses
        .iter()
        .map(|h| format!("#{} {}", h.program_number, h.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn play(bet: &GeneratedBet) -> String {
    let Some(key) = bet.horses.first() else {
        return String::new();
    };

    match bet.bet_type {
        BetType::Win => format!("#{} {} to win at {}", key.program_number, key.name, key.odds_display),
        BetType::Place => format!("#{} {} to finish first or second", key.program_number, key.name),
        BetType::Show => format!("#{} {} to finish in the top three", key.program_number, key.name),
        BetType::ValueBomb => format!(
            "Value bomb on #{} {} at {}",
            key.program_number, key.name, key.odds_display
        ),
        BetType::HiddenGem => format!(
            "Hidden gem #{} {} at {}",
            key.program_number, key.name, key.odds_display
        ),
        BetType::ExactaKeyOver => format!(
            "#{} {} to win over {} other(s)",
            key.program_number,
            key.name,
            bet.horses.len() - 1
        ),
        BetType::ExactaKeyUnder => format!(
            "#{} {} to run second under {} other(s)",
            key.program_number,
            key.name,
            bet.horses.len() - 1
        ),
        BetType::TrifectaWheel => format!(
            "#{} {} on top with {} others underneath",
            key.program_number,
            key.name,
            bet.horses.len() - 1
        ),
        _ => format!("{} covering {}", bet.bet_type.label(), names(bet)),
    }
}

/// Fill in the narrative from the bet's final numbers.
pub(super) fn narrate(bet: &mut GeneratedBet) {
    let category = match bet.special_category {
        Some(SpecialCategory::Nuclear) => " Nuclear longshot.",
        Some(SpecialCategory::Diamond) => " Hidden diamond.",
        Some(SpecialCategory::ValueBomb) => " Value bomb.",
        None => "",
    };

    let combos = bet.combinations();
    let cost = if combos > 1 {
        format!(
            "{} combinations at {} for {}",
            combos,
            format_currency(bet.amount),
            format_currency(bet.total_cost)
        )
    } else {
        format_currency(bet.total_cost)
    };

    bet.narrative = format!(
        "{}. {} returns {} to {} (about {:.0}% to hit).{}",
        play(bet),
        cost,
        format_currency(bet.potential_return.min),
        format_currency(bet.potential_return.max),
        bet.hit_probability * 100.0,
        category
    );

    if bet.explanation.is_empty() {
        bet.explanation.push(format!("{} from {}", bet.bet_type.label(), bet.tier));
    }
}
