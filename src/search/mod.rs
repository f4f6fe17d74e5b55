//! The expectiminimax search stack: base alpha-beta, an optional
//! transposition cache, iterative deepening, follow-up-tracked extended
//! search, and root-parallel threaded search.
//!
//! The four layers are plain functions that call into each other rather
//! than nested generic structs — there's exactly one concrete state type
//! and one concrete evaluator, so generic bounds would buy nothing here.

pub mod base;
pub mod extended;
pub mod iterative;
pub mod threaded;
pub mod transposition;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A recursive search result that may have been cut short by a deadline.
/// Recoverable — never crosses a public API; the iterative layer always
/// absorbs it into the best depth completed so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    TimedOut,
}

/// Short-circuits a recursive search function on [`Outcome::TimedOut`],
/// analogous to `?` for `Result` (which `Outcome` cannot use directly
/// without the unstable `Try` trait).
macro_rules! try_outcome {
    ($e:expr) => {
        match $e {
            $crate::search::Outcome::Done(v) => v,
            $crate::search::Outcome::TimedOut => return $crate::search::Outcome::TimedOut,
        }
    };
}
pub(crate) use try_outcome;

/// Spawns a detached timer that flips the returned flag once `seconds` have
/// elapsed. Used to thread a wall-clock deadline through recursive search
/// without checking `Instant::now()` at every node.
pub fn spawn_deadline(seconds: f64) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    if seconds.is_finite() && seconds > 0.0 {
        let handle = Arc::clone(&flag);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs_f64(seconds));
            handle.store(true, Ordering::Relaxed);
        });
    } else {
        flag.store(true, Ordering::Relaxed);
    }
    flag
}
