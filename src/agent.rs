//! The automatic decision-making agent: caches a predicted follow-up list
//! and only re-searches when the live game diverges from it. There's one
//! `Agent` trait and one concrete type driving it automatically, with no
//! interactive-confirmation path (`confirm` is a no-op).

use std::collections::VecDeque;

use log::debug;

use crate::constants::{SearchConfig, MAX_SHALLOW_DEPTH};
use crate::error::prediction_miss;
use crate::event::Event;
use crate::search::threaded;
use crate::state::State;
use crate::state_machine;

pub trait Agent {
    /// Given the live `state` and its already-enumerated `children`,
    /// returns which child actually happened.
    fn get_successor(&mut self, state: &State, children: &[State]) -> anyhow::Result<State>;

    /// Interactive-confirmation hook, reserved for a future agent variant.
    /// Does nothing observable for the automatic agent.
    fn confirm(&mut self);

    /// Clears the cached follow-up list, forcing a fresh search next call.
    fn reset(&mut self);
}

pub struct IntelligentAgent {
    follow_ups: VecDeque<Event>,
    time_limit_secs: f64,
    cache_cap: usize,
    worker_permits: usize,
}

impl IntelligentAgent {
    pub fn new(time_limit_secs: f64, cache_cap: usize, worker_permits: usize) -> Self {
        Self {
            follow_ups: VecDeque::new(),
            time_limit_secs,
            cache_cap,
            worker_permits,
        }
    }
}

impl Default for IntelligentAgent {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self::new(defaults.time_limit_secs, defaults.cache_cap, rayon::current_num_threads())
    }
}

impl Agent for IntelligentAgent {
    fn get_successor(&mut self, state: &State, children: &[State]) -> anyhow::Result<State> {
        let cache_is_valid = self
            .follow_ups
            .front()
            .is_some_and(|event| event.is_player_turn == state.next_event.is_player_turn);

        if !cache_is_valid {
            self.follow_ups.clear();
            let shallow_depth = MAX_SHALLOW_DEPTH;
            let deep_depth = (shallow_depth + 1).max(state_machine::get_max_depth(state));
            let config = SearchConfig {
                shallow_depth,
                deep_depth,
                time_limit_secs: self.time_limit_secs,
                cache_cap: self.cache_cap,
            };
            debug!("re-searching: shallow_depth={shallow_depth} deep_depth={deep_depth}");
            let result = threaded::search_root(state, &config, self.worker_permits);
            self.follow_ups = result.follow_ups;
        }

        let expected = self
            .follow_ups
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("search produced no follow-up for a non-terminal state"))?;

        match children.iter().find(|child| child.next_event == expected) {
            Some(child) => Ok(child.clone()),
            None => {
                self.follow_ups.clear();
                prediction_miss(expected)
            }
        }
    }

    fn confirm(&mut self) {}

    fn reset(&mut self) {
        self.follow_ups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::handcuffs::Handcuffs;
    use crate::item::Item;
    use crate::magazine::Shotgun;
    use crate::participant::Participant;
    use crate::round::Round;

    fn decision_state() -> State {
        let mut shotgun = Shotgun::load(1, 1);
        shotgun.magazine.reveal(1, Round::Blank, true);
        State {
            probability: 1.0,
            player: Participant::new(2, vec![Item::Saw]),
            dealer: Participant::new(2, vec![]),
            shotgun,
            handcuffs: Handcuffs::None,
            inverter_used: false,
            next_event: Event::evaluating(true),
            max_lives: 4,
        }
    }

    #[test]
    fn searches_fresh_when_cache_empty_then_returns_a_real_child() {
        let state = decision_state();
        let children = state_machine::get_child_states(&state);
        let mut agent = IntelligentAgent::new(1.0, 1000, 1);
        let chosen = agent.get_successor(&state, &children).unwrap();
        assert!(children.contains(&chosen));
    }

    #[test]
    fn reset_clears_cached_follow_ups() {
        let state = decision_state();
        let children = state_machine::get_child_states(&state);
        let mut agent = IntelligentAgent::new(1.0, 1000, 1);
        agent.get_successor(&state, &children).unwrap();
        agent.reset();
        assert!(agent.follow_ups.is_empty());
    }

    #[test]
    fn mismatched_prediction_is_reported_as_prediction_miss() {
        let state = decision_state();
        let mut agent = IntelligentAgent::new(1.0, 1000, 1);
        agent.follow_ups.push_back(Event::new(true, Action::UseItem(Item::Phone)));
        let children = state_machine::get_child_states(&state);
        let err = agent.get_successor(&state, &children).unwrap_err();
        assert!(err.downcast_ref::<crate::error::PredictionMiss>().is_some());
        assert!(agent.follow_ups.is_empty());
    }
}
