//! Error classification for the decision core.
//!
//! Illegal-operation and invariant-violation conditions indicate a caller
//! or internal bug and are fatal — they panic at the point of detection.
//! Only prediction-miss, the one condition an `Agent` caller can
//! meaningfully recover from, crosses the public API as an
//! [`anyhow::Error`]. Search-timeout never crosses a public API at all; it
//! is represented internally by [`crate::search::Outcome`].

use anyhow::bail;

use crate::event::Event;

/// Raised by [`crate::agent::Agent::get_successor`] when a cached follow-up
/// event does not appear among the actual children of the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMiss {
    pub expected: Event,
}

impl std::fmt::Display for PredictionMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "predicted event {:?} did not occur among the state's children",
            self.expected
        )
    }
}

impl std::error::Error for PredictionMiss {}

pub fn prediction_miss<T>(expected: Event) -> anyhow::Result<T> {
    bail!(PredictionMiss { expected })
}
