//! Deterministic stand-ins for the `Randomizer`/`ItemDrawer` collaborator
//! traits, used only by this crate's own integration tests. Production
//! callers supply their own (see `src/collaborators.rs`).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shell_duel_core::collaborators::{ItemDrawer, Randomizer};
use shell_duel_core::item::Item;
use shell_duel_core::state::State;

/// Samples a child proportionally to its transition probability, the
/// obvious reference behavior for a probability-weighted chance node.
pub struct WeightedRandomizer {
    rng: StdRng,
}

impl WeightedRandomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Randomizer<State> for WeightedRandomizer {
    fn get_successor(&mut self, children: &[State]) -> State {
        assert!(!children.is_empty(), "cannot sample a successor from no children");
        let total: f64 = children.iter().map(|c| c.probability).sum();
        let mut draw = self.rng.gen::<f64>() * total;
        for child in children {
            if draw < child.probability {
                return child.clone();
            }
            draw -= child.probability;
        }
        children.last().cloned().unwrap()
    }

    fn get_hidden_knowledge_successor(&mut self, children: &[State], is_phone: bool) -> State {
        let mut chosen = self.get_successor(children);
        if is_phone {
            chosen.shotgun.magazine.mark_dealer_possibly_knows(0);
        }
        chosen
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Hands back a fixed item set regardless of round parameters; enough to
/// exercise the `ItemDrawer` trait boundary without modeling a real
/// distribution.
pub struct FixedItemDrawer {
    pub player_items: Vec<Item>,
    pub dealer_items: Vec<Item>,
}

impl ItemDrawer for FixedItemDrawer {
    fn get_items(&mut self, _max_health: u32, _player_items: &[Item], _dealer_items: &[Item]) -> (Vec<Item>, Vec<Item>) {
        (self.player_items.clone(), self.dealer_items.clone())
    }

    fn set_seed(&mut self, _seed: u64) {}
}
