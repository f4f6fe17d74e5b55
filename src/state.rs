//! The full game state plus its transposition-aware equality and hashing.
//!
//! `Hash` is driven by [`StateKey`], a bit-packed summary of participant,
//! shotgun, handcuffs and event state folded into one integer; `PartialEq`/
//! `Eq` are implemented directly against the fields that define identity,
//! which is the only thing that actually has to agree with the packed hash.

use crate::event::Event;
use crate::handcuffs::Handcuffs;
use crate::item::Item;
use crate::magazine::Shotgun;
use crate::participant::Participant;

#[derive(Debug, Clone)]
pub struct State {
    /// Transition probability from the parent. 1.0 for decision children;
    /// sums to 1.0 (within EPSILON) across chance-node siblings. Not part
    /// of identity.
    pub probability: f64,
    pub player: Participant,
    pub dealer: Participant,
    pub shotgun: Shotgun,
    pub handcuffs: Handcuffs,
    /// One-shot modifier: while set, the chambered round's effective
    /// colour is flipped relative to its true state during resolution, and
    /// is cleared the instant the chambered round is consumed.
    pub inverter_used: bool,
    pub next_event: Event,
    /// Immutable after the round starts.
    pub max_lives: u32,
}

impl State {
    pub fn active(&self) -> &Participant {
        if self.next_event.is_player_turn {
            &self.player
        } else {
            &self.dealer
        }
    }

    pub fn active_mut(&mut self) -> &mut Participant {
        if self.next_event.is_player_turn {
            &mut self.player
        } else {
            &mut self.dealer
        }
    }

    pub fn opponent(&self) -> &Participant {
        if self.next_event.is_player_turn {
            &self.dealer
        } else {
            &self.player
        }
    }

    pub fn opponent_mut(&mut self) -> &mut Participant {
        if self.next_event.is_player_turn {
            &mut self.dealer
        } else {
            &mut self.player
        }
    }

    /// Switches whose turn it is unless handcuffs suppress the switch. Only
    /// ever invoked for shot events.
    pub fn switch_turn_respecting_handcuffs(&mut self) {
        let decayed = self.handcuffs.decay();
        self.handcuffs = decayed;
        if decayed == Handcuffs::None {
            self.next_event.is_player_turn = !self.next_event.is_player_turn;
        }
    }

    pub fn reset_lives(&mut self) {
        self.player.lives = self.max_lives;
        self.dealer.lives = self.max_lives;
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.player == other.player
            && self.dealer == other.dealer
            && self.handcuffs == other.handcuffs
            && self.inverter_used == other.inverter_used
            && self.max_lives == other.max_lives
            && self.next_event == other.next_event
            && shotgun_identity_eq(&self.shotgun, &other.shotgun)
    }
}

impl Eq for State {}

fn shotgun_identity_eq(a: &Shotgun, b: &Shotgun) -> bool {
    if a.is_sawed_off() != b.is_sawed_off() {
        return false;
    }
    if a.magazine.remaining_rounds() != b.magazine.remaining_rounds() {
        return false;
    }
    if a.magazine.total_live() != b.magazine.total_live() || a.magazine.total_blank() != b.magazine.total_blank() {
        return false;
    }
    (0..a.magazine.remaining_rounds()).all(|i| a.magazine.slot(i).knowledge_eq(b.magazine.slot(i)))
}

impl std::hash::Hash for State {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        StateKey::from(self).0.hash(state)
    }
}

/// A compact bit-packed summary of a [`State`]'s identity fields. Used only
/// to feed `Hash`; it is intentionally not injective (e.g. handcuffs folds
/// to one bit, item counts saturate at 3) since a hash only needs to agree
/// with `PartialEq`, not distinguish everything `PartialEq` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey(u128);

impl StateKey {
    fn push(&mut self, value: u64, bits: u32) {
        debug_assert!(bits < 64);
        debug_assert!(value < (1u64 << bits));
        self.0 = (self.0 << bits) | value as u128;
    }
}

impl From<&State> for StateKey {
    fn from(state: &State) -> Self {
        let mut key = StateKey(0);
        key.push(participant_hash_bits(&state.player) as u64, 21);
        key.push(participant_hash_bits(&state.dealer) as u64, 21);
        for i in 0..state.shotgun.magazine.remaining_rounds() {
            key.push(state.shotgun.magazine.slot(i).knowledge_hash_bit() as u64, 1);
        }
        key.push(state.shotgun.is_sawed_off() as u64, 1);
        key.push(state.handcuffs.hash_bits() as u64, 1);
        key.push(state.next_event.hash_bits() as u64, 2);
        key.push((state.max_lives % 2) as u64, 1);
        key.push(state.inverter_used as u64, 1);
        key
    }
}

/// 3 bits of lives (saturating at 7) plus 2 bits per item type (saturating
/// at 3), 9 item types -> 21 bits total.
fn participant_hash_bits(p: &Participant) -> u32 {
    let mut bits = (p.lives.min(7)) & 0b111;
    for item in Item::ALL {
        let count = p.item_count(item).min(3) as u32;
        bits = (bits << 2) | count;
    }
    bits
}
