//! External collaborator interfaces: round sampling and item drawing.
//!
//! No concrete randomized implementation ships from this crate; production
//! callers supply their own, and `tests/support` carries deterministic
//! stand-ins used by this crate's own test suite.

use crate::event::Event;
use crate::item::Item;
use crate::state::State;

/// Resolves the hidden information a [`State`]'s chance nodes depend on:
/// which concrete successor actually happened, and what a participant's
/// imperfect information about it should become.
pub trait Randomizer<S = State> {
    /// Samples one of `children` according to their transition
    /// probabilities, returning the chosen successor.
    fn get_successor(&mut self, children: &[S]) -> S;

    /// As [`Randomizer::get_successor`], but additionally updates the
    /// knowledge flags on the chosen successor to reflect a revealing event
    /// `(is_phone)` — Phone's disclosure marks `dealer_possibly_knows` rather
    /// than `dealer_knows`, since the dealer's visibility into a human
    /// player's phone call is inferred, not certain.
    fn get_hidden_knowledge_successor(&mut self, children: &[S], is_phone: bool) -> S;

    fn set_seed(&mut self, seed: u64);
}

/// Supplies a fresh item hand for a new round.
pub trait ItemDrawer {
    /// Draws between [`crate::constants::MIN_ITEM_DRAW`] and
    /// [`crate::constants::MAX_ITEM_DRAW`] items for each side, respecting
    /// [`Item::max_multiplicity`], given the round's max health and each
    /// side's currently held items (so a drawer can avoid exceeding a cap
    /// that counts existing copies).
    fn get_items(&mut self, max_health: u32, player_items: &[Item], dealer_items: &[Item]) -> (Vec<Item>, Vec<Item>);

    fn set_seed(&mut self, seed: u64);
}

/// A single principal-variation step surfaced by an [`crate::agent::Agent`]:
/// the event the agent expects to have happened, paired with the search
/// score backing that expectation, used by callers that want to show their
/// reasoning rather than just its conclusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub event: Event,
    pub score: f64,
}
