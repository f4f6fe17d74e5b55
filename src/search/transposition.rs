//! Equality-keyed transposition cache: `State -> (score, depth searched)`.
//!
//! The key is the `State` itself rather than a separately-derived key type,
//! since `State`'s own `Hash`/`Eq` impls already implement exactly the
//! transposition-identity rule a key type would otherwise have to re-derive.

use std::sync::{Arc, Mutex};

use log::trace;
use rustc_hash::FxHashMap;

use crate::state::State;

#[derive(Clone, Default)]
pub struct TranspositionCache {
    table: Arc<Mutex<FxHashMap<State, (f64, u32)>>>,
    cap: usize,
}

impl TranspositionCache {
    pub fn new(cap: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(FxHashMap::default())),
            cap,
        }
    }

    /// Returns the cached score if an entry exists at `requested_depth` or
    /// deeper.
    pub fn get(&self, state: &State, requested_depth: u32) -> Option<f64> {
        let table = self.table.lock().unwrap();
        table.get(state).and_then(|&(score, cached_depth)| {
            if cached_depth >= requested_depth {
                trace!("transposition hit at depth {cached_depth} (wanted {requested_depth})");
                Some(score)
            } else {
                None
            }
        })
    }

    /// Records a freshly-computed score. Freely replaces an arbitrary entry
    /// once the cache is at capacity rather than maintaining strict LRU
    /// order.
    pub fn insert(&self, state: State, score: f64, depth: u32) {
        let mut table = self.table.lock().unwrap();
        if table.len() >= self.cap && !table.contains_key(&state) {
            if let Some(victim) = table.keys().next().cloned() {
                table.remove(&victim);
            }
        }
        table.insert(state, (score, depth));
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
