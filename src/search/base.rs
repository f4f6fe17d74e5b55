//! The base recursive expectiminimax search with alpha-beta pruning, with
//! an optional transposition cache folded in (see `search/mod.rs`'s module
//! doc for why the two share one function instead of two nested ones).

use std::sync::atomic::{AtomicBool, Ordering};

use log::trace;

use crate::evaluator;
use crate::state::State;
use crate::state_machine;

use super::transposition::TranspositionCache;
use super::{try_outcome, Outcome};

/// Scores `state` to `depth` plies, honoring `alpha`/`beta` at decision
/// nodes and taking the full expectation at chance nodes. `cache`, if
/// supplied, is consulted and populated at every non-terminal node.
pub fn search_scalar(
    state: &State,
    depth: u32,
    mut alpha: f64,
    mut beta: f64,
    cache: Option<&TranspositionCache>,
    timeout: &AtomicBool,
) -> Outcome<f64> {
    if timeout.load(Ordering::Relaxed) {
        return Outcome::TimedOut;
    }
    if state_machine::is_finished(state) {
        return Outcome::Done(evaluator::score(state));
    }
    if let Some(cache) = cache {
        if let Some(score) = cache.get(state, depth) {
            return Outcome::Done(score);
        }
    }
    if depth == 0 {
        return Outcome::Done(evaluator::score(state));
    }

    let children = state_machine::get_child_states(state);
    if children.len() == 1 {
        // Single-child shortcut: forced lines don't consume depth budget.
        return search_scalar(&children[0], depth, alpha, beta, cache, timeout);
    }

    let score = if state_machine::is_evaluation_phase(&state.next_event) {
        let maximizing = state.next_event.is_player_turn;
        let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
        for child in &children {
            let value = try_outcome!(search_scalar(child, depth - 1, alpha, beta, cache, timeout));
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if alpha >= beta {
                trace!("alpha-beta cutoff at depth {depth}");
                break;
            }
        }
        best
    } else {
        let total_probability: f64 = children.iter().map(|c| c.probability).sum();
        debug_assert!(
            approx::abs_diff_eq!(total_probability, 1.0, epsilon = crate::constants::EPSILON),
            "chance-node children do not sum to 1 (got {total_probability})"
        );
        let mut sum = 0.0;
        for child in &children {
            let value = try_outcome!(search_scalar(child, depth - 1, f64::NEG_INFINITY, f64::INFINITY, cache, timeout));
            sum += child.probability * value;
        }
        sum
    };

    if let Some(cache) = cache {
        cache.insert(state.clone(), score, depth);
    }
    Outcome::Done(score)
}
