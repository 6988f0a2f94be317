//! Finishing-order probabilities using the (extended) Harville formula.
//!
//! Harville: P(A=1st, B=2nd) = P(A) * P(B) / (1 - P(A))
//! Extended: P(A, B, C) = P(A) * P(B | A) * P(C | A, B)
//!   where P(C | A, B) = P(C) / (1 - P(A) - P(B))

use std::collections::HashMap;

use crate::types::ProgramNumber;

/// Win probabilities keyed by program number
pub type WinProbs = HashMap<ProgramNumber, f64>;

/// Normalize expected win percents into probabilities summing to one.
pub fn normalize_win_probs<I>(percents: I) -> WinProbs
where
    I: IntoIterator<Item = (ProgramNumber, f64)>,
{
    let raw: Vec<(ProgramNumber, f64)> = percents
        .into_iter()
        .map(|(p, pct)| (p, if pct.is_finite() { pct.max(0.0) } else { 0.0 }))
        .collect();
    let total: f64 = raw.iter().map(|(_, pct)| pct).sum();

    raw.into_iter()
        .map(|(p, pct)| (p, if total > 0.0 { pct / total } else { 0.0 }))
        .collect()
}

/// Probability of the horses finishing in exactly this order at the front.
pub fn ordered_probability(order: &[ProgramNumber], win_probs: &WinProbs) -> f64 {
    let mut prob = 1.0;
    let mut used = 0.0;

    for (i, program) in order.iter().enumerate() {
        if order[..i].contains(program) {
            return 0.0;
        }
        let p = win_probs.get(program).copied().unwrap_or(0.0);
        let remaining = 1.0 - used + 1e-10;
        prob *= p / remaining;
        used += p;
    }

    prob
}

/// Probability that `horse` finishes in the first `places` positions.
pub fn top_n_probability(horse: ProgramNumber, places: usize, win_probs: &WinProbs) -> f64 {
    let field: Vec<ProgramNumber> = win_probs.keys().copied().collect();
    let mut total = 0.0;

    for position in 0..places.min(field.len()) {
        // Every ordering of `position` rivals ahead of `horse`
        let rivals: Vec<ProgramNumber> = field.iter().copied().filter(|p| *p != horse).collect();
        for mut ahead in permutations(&rivals, position) {
            ahead.push(horse);
            total += ordered_probability(&ahead, win_probs);
        }
    }

    total.min(1.0)
}

/// Sum of ordered probabilities over every `k`-permutation of `horses`.
pub fn box_probability(horses: &[ProgramNumber], k: usize, win_probs: &WinProbs) -> f64 {
    permutations(horses, k)
        .iter()
        .map(|order| ordered_probability(order, win_probs))
        .sum::<f64>()
        .min(1.0)
}

/// All ordered selections of `k` distinct items.
pub fn permutations(items: &[ProgramNumber], k: usize) -> Vec<Vec<ProgramNumber>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > items.len() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let rest: Vec<ProgramNumber> = items
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| *p)
            .collect();
        for mut tail in permutations(&rest, k - 1) {
            tail.insert(0, *item);
            out.push(tail);
        }
    }
    out
}
