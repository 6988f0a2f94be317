//! Odds string parsing and display.
//!
//! Odds are carried as fractional "N-1" values: "5-2" is 2.5, "EVEN" is 1.0.

use regex::Regex;
use std::sync::OnceLock;

/// Lowest fractional odds accepted; anything shorter is clamped.
pub const MIN_ODDS: f64 = 0.05;

fn fraction_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[-/:]\s*(\d+(?:\.\d+)?)\s*$").expect("valid odds pattern")
    })
}

/// Parse an odds string into fractional odds.
///
/// Accepts "N-D", "N/D", "N:D", "EVEN"/"EVN"/"EV" and plain decimals ("3.5").
/// Returns `None` for anything else.
pub fn try_parse_odds(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.to_uppercase().as_str() {
        "EVEN" | "EVN" | "EV" | "EVENS" => return Some(1.0),
        _ => {}
    }

    if let Some(caps) = fraction_re().captures(trimmed) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        return Some((num / den).max(MIN_ODDS));
    }

    let value: f64 = trimmed.parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value.max(MIN_ODDS))
    } else {
        None
    }
}

/// Parse odds, falling back to `fallback` for malformed input.
pub fn parse_odds(raw: &str, fallback: f64) -> f64 {
    match try_parse_odds(raw) {
        Some(odds) => odds,
        None => {
            tracing::debug!("Unparseable odds {:?}, using {}-1", raw, fallback);
            fallback
        }
    }
}

/// Render fractional odds the way a tote board does ("5-2", "9-1", "EVEN").
pub fn format_odds(odds: f64) -> String {
    if !odds.is_finite() || odds <= 0.0 {
        return "N/A".to_string();
    }
    if (odds - 1.0).abs() < 1e-9 {
        return "EVEN".to_string();
    }

    let whole = odds.round();
    if (odds - whole).abs() < 1e-9 {
        return format!("{}-1", whole as i64);
    }

    // Common half/fifth fractions
    for den in [2.0, 5.0, 4.0, 10.0] {
        let num = odds * den;
        if (num - num.round()).abs() < 1e-6 {
            return format!("{}-{}", num.round() as i64, den as i64);
        }
    }

    format!("{:.1}-1", odds)
}

/// Implied win probability (0-1) of fractional odds, ignoring takeout.
pub fn implied_probability(odds: f64) -> f64 {
    if odds.is_finite() && odds > 0.0 {
        1.0 / (odds + 1.0)
    } else {
        0.0
    }
}

/// Fractional odds that would be fair for a win probability (0-1).
pub fn fair_odds(probability: f64) -> f64 {
    if probability <= 0.0 || !probability.is_finite() {
        return f64::INFINITY;
    }
    (1.0 / probability - 1.0).max(0.0)
}
