//! Betting-window strings and currency formatting.

use crate::betting::BetType;
use crate::types::ProgramNumber;

/// Format a dollar amount: whole amounts without decimals, otherwise two.
///
/// `format_currency(1000.0) == "$1,000"`, `format_currency(0.5) == "$0.50"`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let rem = cents % 100;

    let grouped = group_thousands(dollars);
    if rem == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, rem)
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn joined(programs: &[ProgramNumber], sep: &str) -> String {
    programs.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(sep)
}

/// Render a ticket the way it is read out at the betting window.
///
/// For key and wheel bets the first program number is the key horse.
pub fn window_instruction(bet_type: BetType, programs: &[ProgramNumber], amount: f64) -> String {
    let stake = format_currency(amount);
    let Some((key, rest)) = programs.split_first() else {
        return String::new();
    };

    match bet_type {
        BetType::Win | BetType::ValueBomb | BetType::HiddenGem => {
            format!("{} to WIN on number {}", stake, key)
        }
        BetType::Place => format!("{} to PLACE on number {}", stake, key),
        BetType::Show => format!("{} to SHOW on number {}", stake, key),
        BetType::ExactaBox => format!("{} EXACTA BOX {}", stake, joined(programs, "-")),
        BetType::ExactaKeyOver => format!("{} EXACTA {} over {}", stake, key, joined(rest, ",")),
        BetType::ExactaKeyUnder => format!("{} EXACTA {} over {}", stake, joined(rest, ","), key),
        BetType::TrifectaBox => format!("{} TRIFECTA BOX {}", stake, joined(programs, "-")),
        BetType::TrifectaWheel => format!("{} TRIFECTA {} with {}", stake, key, joined(rest, ",")),
        BetType::Quinella => format!("{} QUINELLA {}", stake, joined(programs, "-")),
        BetType::Superfecta => format!("{} SUPERFECTA BOX {}", stake, joined(programs, "-")),
    }
}
