//! Compile-time tunables for the game model and the search stack.
//!
//! Kept as `pub const`s rather than a config file/env layer since nothing
//! downstream needs to vary them at runtime (a caller who wants different
//! knobs builds a [`SearchConfig`] instead of touching these).

/// Tolerance used when comparing probability masses and scores.
pub const EPSILON: f64 = 1.0e-10;

/// Default ply count for the "shallow" phase of a two-phase search.
pub const MAX_SHALLOW_DEPTH: u32 = 3;

/// Default wall-clock budget, in seconds, for a single agent decision.
pub const TIME_LIMIT_SECS: f64 = 30.0;

pub const MIN_LIVES: u32 = 2;
pub const MAX_LIVES: u32 = 4;

pub const MIN_SHELLS: u32 = 2;
pub const MAX_SHELLS: u32 = 8;

pub const MIN_ITEM_DRAW: usize = 2;
pub const MAX_ITEM_DRAW: usize = 5;

/// Upper bound on items a single participant may hold at once.
pub const MAX_SLOTS: usize = 8;

/// Upper bound on the transposition cache's entry count before entries are
/// freely replaced rather than strictly evicted.
pub const MAX_CACHE_SIZE: usize = 5_000_000;

/// Number of empty item slots beyond which the evaluator's empty-slot bonus
/// stops growing (`MAX_SLOTS - MAX_ITEM_DRAW`).
pub const MAX_SCORING_EMPTY_SLOTS: usize = MAX_SLOTS - MAX_ITEM_DRAW;

/// Bundles the per-call search knobs so tests and callers can override
/// defaults without touching the constants above, instead of relying on
/// global mutable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub shallow_depth: u32,
    pub deep_depth: u32,
    pub time_limit_secs: f64,
    pub cache_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            shallow_depth: MAX_SHALLOW_DEPTH,
            deep_depth: MAX_SHALLOW_DEPTH + 1,
            time_limit_secs: TIME_LIMIT_SECS,
            cache_cap: MAX_CACHE_SIZE,
        }
    }
}
