//! Follow-up-tracked search: the base score plus the principal variation
//! through decision nodes, stopping at the first chance node.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;

use crate::event::{Action, Event};
use crate::state::State;
use crate::state_machine;

use super::base::search_scalar;
use super::transposition::TranspositionCache;
use super::{try_outcome, Outcome};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub follow_ups: VecDeque<Event>,
    pub score: f64,
}

/// Searches `state` to `shallow_depth` plies of decision nodes, recording
/// follow-up events, then switches to a `deep_depth`-ply scalar search the
/// moment it either exhausts the shallow budget or reaches a chance node.
pub fn search_extended(
    state: &State,
    shallow_depth: u32,
    deep_depth: u32,
    mut alpha: f64,
    mut beta: f64,
    cache: &TranspositionCache,
    timeout: &AtomicBool,
) -> Outcome<SearchResult> {
    if state_machine::is_finished(state) {
        return Outcome::Done(SearchResult {
            follow_ups: VecDeque::new(),
            score: crate::evaluator::score(state),
        });
    }

    let is_fresh_decision = state.next_event.action == Action::Evaluating;
    let evaluation_phase = state_machine::is_evaluation_phase(&state.next_event);

    if shallow_depth == 0 || !evaluation_phase {
        let score = try_outcome!(search_scalar(state, deep_depth, alpha, beta, Some(cache), timeout));
        return Outcome::Done(SearchResult {
            follow_ups: VecDeque::new(),
            score,
        });
    }

    let children = state_machine::get_child_states(state);

    if !is_fresh_decision {
        // A deterministic item's resolution hop: not a new decision (the
        // event for it was already recorded one frame up), so it's passed
        // through untouched and doesn't consume the shallow-depth budget.
        debug_assert_eq!(children.len(), 1);
        return search_extended(&children[0], shallow_depth, deep_depth, alpha, beta, cache, timeout);
    }

    if children.len() == 1 {
        // A forced single legal action is still a genuine decision — just
        // one with no alternative — so its event belongs in the follow-ups.
        let mut result = try_outcome!(search_extended(
            &children[0],
            shallow_depth,
            deep_depth,
            alpha,
            beta,
            cache,
            timeout
        ));
        result.follow_ups.push_front(children[0].next_event);
        return Outcome::Done(result);
    }

    let maximizing = state.next_event.is_player_turn;
    let mut best: Option<SearchResult> = None;
    for child in &children {
        let mut result = try_outcome!(search_extended(
            child,
            shallow_depth - 1,
            deep_depth,
            alpha,
            beta,
            cache,
            timeout
        ));
        result.follow_ups.push_front(child.next_event);

        let improves = match &best {
            None => true,
            Some(b) => {
                if maximizing {
                    result.score > b.score
                } else {
                    result.score < b.score
                }
            }
        };
        if improves {
            best = Some(result);
        }
        let best_score = best.as_ref().unwrap().score;
        if maximizing {
            alpha = alpha.max(best_score);
        } else {
            beta = beta.min(best_score);
        }
        if alpha >= beta {
            break;
        }
    }
    Outcome::Done(best.expect("invariant violation: decision node produced no children"))
}
