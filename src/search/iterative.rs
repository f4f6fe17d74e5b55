//! Iterative deepening: reruns the base search at depth 1, 2, ... up to a
//! cap, returning the best depth actually completed before a deadline.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::evaluator;
use crate::state::State;

use super::base::search_scalar;
use super::spawn_deadline;
use super::transposition::TranspositionCache;
use super::Outcome;

/// Runs `search_scalar` at increasing depths up to `max_depth`, stopping
/// early if the deadline fires. Always returns a usable score — at worst
/// the static evaluation of `state` if even depth 1 did not complete.
pub fn search_iterative(state: &State, max_depth: u32, time_limit_secs: f64, cache: &TranspositionCache) -> f64 {
    search_iterative_with_deadline(state, max_depth, &spawn_deadline(time_limit_secs), cache)
}

fn search_iterative_with_deadline(state: &State, max_depth: u32, timeout: &AtomicBool, cache: &TranspositionCache) -> f64 {
    let mut best = evaluator::score(state);
    for depth in 1..=max_depth {
        match search_scalar(state, depth, f64::NEG_INFINITY, f64::INFINITY, Some(cache), timeout) {
            Outcome::Done(score) => {
                best = score;
                debug!("iterative deepening completed depth {depth}, score {score}");
            }
            Outcome::TimedOut => {
                warn!("iterative deepening timed out before completing depth {depth}");
                break;
            }
        }
        if timeout.load(Ordering::Relaxed) {
            break;
        }
    }
    best
}
