//! Action Selection
//!
//! Weighted random choice over a candidate list: sum the integer weights,
//! draw uniformly in `[0, total)`, and walk the cumulative intervals. The
//! last candidate is the fallback, which is also how forced zero-weight
//! candidates (a lone attack or scent move) get selected.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{Action, WeightedAction};

/// Selects one action from the candidates, or `None` when the list is empty.
pub fn choose_weighted(candidates: &[WeightedAction], rng: &mut SmallRng) -> Option<Action> {
    let last = candidates.last()?;
    let total: u32 = candidates.iter().map(|candidate| candidate.weight).sum();
    if total == 0 {
        return Some(last.action.clone());
    }
    let draw = rng.gen_range(0..total);
    let mut cumulative = 0;
    for candidate in candidates {
        cumulative += candidate.weight;
        if draw < cumulative {
            return Some(candidate.action.clone());
        }
    }
    Some(last.action.clone())
}
