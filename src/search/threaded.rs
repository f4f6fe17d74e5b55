//! Root-parallel search: one rayon task per root child, bounded by an
//! atomic permit counter, combined once every task finishes or the
//! wall-clock deadline fires.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::warn;
use rayon::prelude::*;

use crate::constants::SearchConfig;
use crate::state::State;
use crate::state_machine;

use super::extended::{search_extended, SearchResult};
use super::transposition::TranspositionCache;
use super::{spawn_deadline, Outcome};

struct Permit<'a> {
    free: &'a AtomicUsize,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.free.fetch_add(1, Ordering::AcqRel);
    }
}

fn acquire(free: &AtomicUsize) -> Permit<'_> {
    loop {
        let current = free.load(Ordering::Acquire);
        if current > 0
            && free
                .compare_exchange(current, current - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            return Permit { free };
        }
        std::thread::yield_now();
    }
}

/// Runs the full two-phase search from the root, parallelizing across the
/// root's decision children. `worker_permits` bounds how many children are
/// searched concurrently; a caller with no opinion should pass
/// `rayon::current_num_threads()`.
pub fn search_root(state: &State, config: &SearchConfig, worker_permits: usize) -> SearchResult {
    debug_assert!(
        state_machine::is_evaluation_phase(&state.next_event),
        "threaded search must start from a decision node"
    );
    let timeout = spawn_deadline(config.time_limit_secs);
    let children = state_machine::get_child_states(state);

    if children.len() == 1 {
        let cache = TranspositionCache::new(config.cache_cap);
        let mut result = run_one(&children[0], config, &cache, &timeout);
        result.follow_ups.push_front(children[0].next_event);
        return result;
    }

    let maximizing = state.next_event.is_player_turn;
    let free_permits = AtomicUsize::new(worker_permits.max(1));

    let results: Vec<Option<SearchResult>> = children
        .par_iter()
        .map(|child| {
            let _permit = acquire(&free_permits);
            let cache = TranspositionCache::new(config.cache_cap);
            match search_extended(
                child,
                config.shallow_depth,
                config.deep_depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                &cache,
                &timeout,
            ) {
                Outcome::Done(mut result) => {
                    result.follow_ups.push_front(child.next_event);
                    Some(result)
                }
                Outcome::TimedOut => None,
            }
        })
        .collect();

    let completed = results.iter().filter(|r| r.is_some()).count();
    if completed < results.len() {
        warn!(
            "search deadline elapsed with {} of {} root children unscored",
            results.len() - completed,
            results.len()
        );
    }

    results
        .into_iter()
        .flatten()
        .reduce(|a, b| {
            let b_is_better = if maximizing { b.score > a.score } else { b.score < a.score };
            if b_is_better {
                b
            } else {
                a
            }
        })
        .expect("invariant violation: every root child timed out before completing even depth 1")
}

fn run_one(state: &State, config: &SearchConfig, cache: &TranspositionCache, timeout: &AtomicBool) -> SearchResult {
    match search_extended(
        state,
        config.shallow_depth,
        config.deep_depth,
        f64::NEG_INFINITY,
        f64::INFINITY,
        cache,
        timeout,
    ) {
        Outcome::Done(result) => result,
        Outcome::TimedOut => SearchResult {
            follow_ups: Default::default(),
            score: crate::evaluator::score(state),
        },
    }
}
