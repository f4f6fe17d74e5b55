//! The authoritative rules engine: terminal tests, phase classification, and
//! successor enumeration.
//!
//! Exposed as free functions rather than a trait: there is exactly one rule
//! set, so a trait would only add indirection the search stack never needs
//! (traits are reserved for the genuine collaborator boundaries:
//! [`crate::agent::Agent`], [`crate::collaborators::Randomizer`],
//! [`crate::collaborators::ItemDrawer`]).

use std::collections::BTreeSet;

use log::trace;

use crate::constants::EPSILON;
use crate::event::{Action, Event};
use crate::handcuffs::Handcuffs;
use crate::item::Item;
use crate::round::{flip, Round};
use crate::state::State;

pub fn is_finished(state: &State) -> bool {
    state.player.lives == 0 || state.dealer.lives == 0 || state.shotgun.magazine.is_empty()
}

/// Whether a state labeled by `event` is a genuine decision/pass-through
/// node (handled by min/max over its — possibly single — children) rather
/// than a probability-weighted chance node. True for a fresh `Evaluating`
/// event and for the five items whose effect resolves immediately with no
/// intervening randomness.
pub fn is_evaluation_phase(event: &Event) -> bool {
    match event.action {
        Action::Evaluating => true,
        Action::UseItem(item) => matches!(
            item,
            Item::Cigarette | Item::Saw | Item::Handcuffs | Item::Inverter | Item::Adrenalin
        ),
        Action::ShootSelf | Action::ShootOther => false,
    }
}

pub fn is_player_turn(state: &State) -> bool {
    state.next_event.is_player_turn
}

/// A hard bound on remaining plies, used as the "deep" depth cap.
pub fn get_max_depth(state: &State) -> u32 {
    let items = state.player.items().len() + state.dealer.items().len();
    let rounds = state.shotgun.magazine.remaining_rounds();
    2 * (items + rounds) as u32
}

pub fn probability_of_blank_round(state: &State, inverted: bool, index: usize) -> f64 {
    state.shotgun.probability_blank(index, inverted)
}

/// Enumerates all legal successors of `state`, together with their
/// transition probabilities. Must not be called on a finished state.
pub fn get_child_states(state: &State) -> Vec<State> {
    debug_assert!(!is_finished(state), "get_child_states called on a finished state");
    let children = match state.next_event.action {
        Action::Evaluating => decision_children(state),
        Action::ShootSelf => resolve_shoot(state, true),
        Action::ShootOther => resolve_shoot(state, false),
        Action::UseItem(item) => resolve_use_item(state, item),
    };
    assert!(!children.is_empty(), "invariant violation: non-terminal state produced no children");
    if children.len() > 1 {
        if is_evaluation_phase(&state.next_event) {
            assert!(
                children.iter().all(|c| approx::abs_diff_eq!(c.probability, 1.0, epsilon = EPSILON)),
                "invariant violation: decision children must each carry probability 1.0"
            );
        } else {
            let total: f64 = children.iter().map(|c| c.probability).sum();
            assert!(
                approx::abs_diff_eq!(total, 1.0, epsilon = EPSILON),
                "invariant violation: chance-node probabilities do not sum to 1 (got {total})"
            );
        }
    }
    children
}

// ---------------------------------------------------------------------
// Decision filters (4.1.1 / 4.1.2)
// ---------------------------------------------------------------------

fn decision_children(state: &State) -> Vec<State> {
    let is_player = state.next_event.is_player_turn;
    let actions = if is_player {
        player_filter(state)
    } else {
        dealer_filter(state)
    };
    trace!("decision filter for {} produced {} candidate actions", if is_player { "player" } else { "dealer" }, actions.len());
    actions
        .into_iter()
        .map(|action| {
            let mut child = state.clone();
            child.probability = 1.0;
            child.next_event = Event::new(is_player, action);
            child
        })
        .collect()
}

fn player_filter(state: &State) -> Vec<Action> {
    let mut actions: Vec<Action> = state
        .player
        .distinct_items()
        .filter(|&item| player_item_allowed(state, item))
        .map(Action::UseItem)
        .collect();

    let known_live = state.shotgun.known_colour(true, 0, state.inverter_used) == Round::Live;
    let suicidal = known_live && state.player.lives == 1;
    if !suicidal && !state.shotgun.is_sawed_off() {
        actions.push(Action::ShootSelf);
    }
    actions.push(Action::ShootOther);
    actions
}

fn player_item_allowed(state: &State, item: Item) -> bool {
    match item {
        Item::Glass => state.shotgun.known_colour(true, 0, state.inverter_used) == Round::Unknown,
        Item::Saw => state.dealer.lives > 1 && !state.shotgun.is_sawed_off(),
        Item::Handcuffs => state.handcuffs.is_allowed_to_add() && state.shotgun.remaining_rounds() > 1,
        Item::Phone | Item::Beer => state.shotgun.remaining_rounds() > 1,
        Item::Inverter => !state.inverter_used,
        Item::Adrenalin => adrenalin_has_target(state, true),
        Item::Cigarette | Item::Pills => true,
    }
}

fn dealer_filter(state: &State) -> Vec<Action> {
    let inverted = state.inverter_used;
    let known = state.shotgun.known_colour(false, 0, inverted);
    let possibly_knows = state.shotgun.slot(0).dealer_possibly_knows;

    let mut allow_self = !state.shotgun.is_sawed_off();
    let mut allow_other = true;
    match known {
        Round::Live => allow_self = false,
        Round::Blank => allow_other = false,
        Round::Unknown => {
            if !possibly_knows {
                let unknown_live = state.shotgun.unknown_live();
                let unknown_blank = state.shotgun.unknown_blank();
                if unknown_blank > unknown_live {
                    allow_other = false;
                } else if unknown_live > unknown_blank {
                    allow_self = false;
                }
            }
        }
    }

    let items: Vec<Item> = state
        .dealer
        .distinct_items()
        .filter(|&item| dealer_item_allowed(state, item, allow_other))
        .collect();
    let saw_selected = items.contains(&Item::Saw);
    if saw_selected {
        // Saw is offered as an explicit alternative to shooting other this
        // turn; it supersedes the plain ShootOther branch here (a second,
        // undiscounted ShootOther becomes available again once the saw has
        // actually been applied, on the dealer's next decision node).
        allow_other = false;
    }

    let may_know_round = known != Round::Unknown || possibly_knows;

    let mut actions: Vec<Action> = items.into_iter().map(Action::UseItem).collect();
    let items_present = !actions.is_empty();

    if !items_present || saw_selected || may_know_round {
        if allow_self {
            actions.push(Action::ShootSelf);
        }
        if allow_other {
            actions.push(Action::ShootOther);
        }
    }

    if actions.is_empty() {
        actions.push(Action::ShootOther);
    }
    actions
}

fn dealer_item_allowed(state: &State, item: Item, allow_other: bool) -> bool {
    let inverted = state.inverter_used;
    let known = state.shotgun.known_colour(false, 0, inverted);
    let possibly_knows = state.shotgun.slot(0).dealer_possibly_knows;
    match item {
        Item::Glass => known == Round::Unknown,
        Item::Cigarette => state.dealer.lives < state.max_lives,
        Item::Pills => {
            state.dealer.lives < state.max_lives
                && state.dealer.item_count(Item::Cigarette) == 0
                && state.dealer.lives != 1
        }
        Item::Beer => known != Round::Live && state.shotgun.remaining_rounds() > 1,
        Item::Handcuffs => state.handcuffs.is_allowed_to_add() && state.shotgun.remaining_rounds() > 1,
        Item::Saw => allow_other && !state.shotgun.is_sawed_off(),
        Item::Phone => state.shotgun.remaining_rounds() > 2,
        Item::Inverter => (known == Round::Blank || possibly_knows) && !state.inverter_used,
        Item::Adrenalin => adrenalin_has_target(state, false),
    }
}

/// Distinct opponent-held item types that would pass the acting side's own
/// filter if the active participant held them instead — the candidate set
/// for Adrenalin. Adrenalin itself is excluded from the candidate set:
/// stealing-and-using a second Adrenalin has no well-defined "further
/// opponent" within this single resolution and is not modeled.
fn adrenalin_targets(state: &State, is_player: bool) -> Vec<Item> {
    let opponent_items: BTreeSet<Item> = state.opponent().distinct_items().collect();
    opponent_items
        .into_iter()
        .filter(|&item| item != Item::Adrenalin)
        .filter(|&item| {
            let mut proxy = state.clone();
            proxy.active_mut().add_item(item);
            if is_player {
                player_item_allowed(&proxy, item)
            } else {
                dealer_item_allowed(&proxy, item, true)
            }
        })
        .collect()
}

fn adrenalin_has_target(state: &State, is_player: bool) -> bool {
    !adrenalin_targets(state, is_player).is_empty()
}

// ---------------------------------------------------------------------
// Action resolution (4.1.3)
// ---------------------------------------------------------------------

fn resolve_shoot(state: &State, target_is_self: bool) -> Vec<State> {
    let inverted = state.inverter_used;
    let was_sawed = state.shotgun.is_sawed_off();
    let mut children = Vec::new();
    for colour in [Round::Blank, Round::Live] {
        let p = match colour {
            Round::Blank => state.shotgun.probability_blank(0, inverted),
            Round::Live => 1.0 - state.shotgun.probability_blank(0, inverted),
            Round::Unknown => unreachable!(),
        };
        if p <= EPSILON {
            continue;
        }
        let mut child = state.clone();
        child.probability = p;
        // `colour` is the effective (post-inversion) identity the weight and
        // damage decision below are computed against; the magazine's own
        // bookkeeping tracks the physical round, so eject needs it flipped
        // back when an inverter is in play.
        let raw_colour = if inverted { flip(colour) } else { colour };
        child.shotgun.eject(0, raw_colour);
        child.inverter_used = false;

        let acting_is_player = child.next_event.is_player_turn;
        let victim_is_player = if target_is_self { acting_is_player } else { !acting_is_player };
        if colour == Round::Live {
            let victim = if victim_is_player { &mut child.player } else { &mut child.dealer };
            victim.lose_life();
            if was_sawed {
                victim.lose_life();
            }
        }

        let normally_switches = !target_is_self || colour == Round::Live;
        let decayed = child.handcuffs.decay();
        child.handcuffs = decayed;
        if normally_switches && decayed == Handcuffs::None {
            child.next_event.is_player_turn = !child.next_event.is_player_turn;
        }
        child.next_event.action = Action::Evaluating;
        children.push(child);
    }
    children
}

fn resolve_use_item(state: &State, item: Item) -> Vec<State> {
    let mut base = state.clone();
    base.active_mut().remove_item(item);
    apply_item_effect(&base, item)
}

fn apply_item_effect(state: &State, item: Item) -> Vec<State> {
    match item {
        Item::Cigarette => {
            let mut child = state.clone();
            let max_lives = child.max_lives;
            child.active_mut().gain_lives(1, max_lives);
            child.next_event.action = Action::Evaluating;
            vec![child]
        }
        Item::Saw => {
            let mut child = state.clone();
            child.shotgun.saw_off();
            child.next_event.action = Action::Evaluating;
            vec![child]
        }
        Item::Handcuffs => {
            let mut child = state.clone();
            child.handcuffs = child.handcuffs.add();
            child.next_event.action = Action::Evaluating;
            vec![child]
        }
        Item::Inverter => {
            let mut child = state.clone();
            child.inverter_used = true;
            child.next_event.action = Action::Evaluating;
            vec![child]
        }
        Item::Glass => resolve_glass(state),
        Item::Beer => resolve_beer(state),
        Item::Phone => resolve_phone(state),
        Item::Pills => resolve_pills(state),
        Item::Adrenalin => resolve_adrenalin(state),
    }
}

fn resolve_glass(state: &State) -> Vec<State> {
    let inverted = state.inverter_used;
    let is_player = state.next_event.is_player_turn;
    let mut children = Vec::new();
    for colour in [Round::Blank, Round::Live] {
        let p = match colour {
            Round::Blank => state.shotgun.probability_blank(0, inverted),
            Round::Live => 1.0 - state.shotgun.probability_blank(0, inverted),
            Round::Unknown => unreachable!(),
        };
        if p <= EPSILON {
            continue;
        }
        let mut child = state.clone();
        child.probability = p;
        if inverted {
            // The inverter is folded permanently into this slot's identity
            // rather than merely labeled: the round's physical colour
            // (raw) is what the unknown pool tracks, but what Glass shows
            // the acting side from here on is the effective colour, so the
            // magazine's live/blank totals swap to match.
            let raw_colour = flip(colour);
            child.shotgun.magazine.convert(0, raw_colour, colour, is_player);
        } else {
            child.shotgun.magazine.reveal(0, colour, is_player);
        }
        child.inverter_used = false;
        child.next_event.action = Action::Evaluating;
        children.push(child);
    }
    children
}

fn resolve_beer(state: &State) -> Vec<State> {
    let inverted = state.inverter_used;
    let mut children = Vec::new();
    for colour in [Round::Blank, Round::Live] {
        let p = match colour {
            Round::Blank => state.shotgun.probability_blank(0, inverted),
            Round::Live => 1.0 - state.shotgun.probability_blank(0, inverted),
            Round::Unknown => unreachable!(),
        };
        if p <= EPSILON {
            continue;
        }
        let mut child = state.clone();
        child.probability = p;
        let raw_colour = if inverted { flip(colour) } else { colour };
        child.shotgun.eject(0, raw_colour);
        child.inverter_used = false;
        child.next_event.action = Action::Evaluating;
        children.push(child);
    }
    children
}

fn resolve_phone(state: &State) -> Vec<State> {
    let remaining = state.shotgun.magazine.remaining_rounds();
    if remaining <= 1 {
        let mut child = state.clone();
        child.probability = 1.0;
        child.next_event.action = Action::Evaluating;
        return vec![child];
    }

    let is_player = state.next_event.is_player_turn;
    let non_chamber = (remaining - 1) as f64;
    let mut children = Vec::new();
    for index in 1..remaining {
        for colour in [Round::Blank, Round::Live] {
            let raw = match colour {
                Round::Blank => state.shotgun.probability_blank(index, false),
                Round::Live => 1.0 - state.shotgun.probability_blank(index, false),
                Round::Unknown => unreachable!(),
            };
            let p = raw / non_chamber;
            if p <= EPSILON {
                continue;
            }
            let mut child = state.clone();
            child.probability = p;
            child.shotgun.magazine.reveal(index, colour, is_player);
            child.next_event.action = Action::Evaluating;
            children.push(child);
        }
    }
    children
}

fn resolve_pills(state: &State) -> Vec<State> {
    let mut lose = state.clone();
    lose.probability = 0.5;
    lose.active_mut().lose_life();
    lose.next_event.action = Action::Evaluating;

    let mut gain = state.clone();
    gain.probability = 0.5;
    let max_lives = gain.max_lives;
    gain.active_mut().gain_lives(2, max_lives);
    gain.next_event.action = Action::Evaluating;

    vec![lose, gain]
}

fn resolve_adrenalin(state: &State) -> Vec<State> {
    let is_player = state.next_event.is_player_turn;
    adrenalin_targets(state, is_player)
        .into_iter()
        .flat_map(|item| {
            let mut child = state.clone();
            child.opponent_mut().remove_item(item);
            apply_item_effect(&child, item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magazine::Shotgun;
    use crate::participant::Participant;

    fn base_state(shotgun: Shotgun, player_items: Vec<Item>, dealer_items: Vec<Item>) -> State {
        State {
            probability: 1.0,
            player: Participant::new(2, player_items),
            dealer: Participant::new(2, dealer_items),
            shotgun,
            handcuffs: Handcuffs::None,
            inverter_used: false,
            next_event: Event::evaluating(true),
            max_lives: 4,
        }
    }

    #[test]
    fn every_nonterminal_state_has_a_child() {
        let state = base_state(Shotgun::load(1, 1), vec![], vec![]);
        assert!(!get_child_states(&state).is_empty());
    }

    #[test]
    fn chance_children_sum_to_one() {
        let state = base_state(Shotgun::load(1, 2), vec![], vec![]);
        let announced = decision_children(&state)
            .into_iter()
            .find(|c| c.next_event.action == Action::ShootOther)
            .unwrap();
        let children = get_child_states(&announced);
        let total: f64 = children.iter().map(|c| c.probability).sum();
        assert!((total - 1.0).abs() < EPSILON);
    }

    #[test]
    fn single_known_round_collapses_to_one_child() {
        let mut shotgun = Shotgun::load(1, 0);
        shotgun.magazine.reveal(0, Round::Live, true);
        let state = base_state(shotgun, vec![], vec![]);
        let announced = decision_children(&state)
            .into_iter()
            .find(|c| c.next_event.action == Action::ShootOther)
            .unwrap();
        let children = get_child_states(&announced);
        assert_eq!(children.len(), 1);
        assert!((children[0].probability - 1.0).abs() < EPSILON);
    }

    #[test]
    fn saw_off_then_shoot_other_deals_double_damage() {
        let mut shotgun = Shotgun::load(1, 0);
        shotgun.magazine.reveal(0, Round::Live, true);
        shotgun.saw_off();
        let mut state = base_state(shotgun, vec![], vec![]);
        state.dealer.lives = 4;
        state.next_event = Event::new(true, Action::ShootOther);
        let children = get_child_states(&state);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].dealer.lives, 2);
        assert!(!children[0].shotgun.is_sawed_off());
    }

    #[test]
    fn shoot_self_blank_keeps_turn() {
        let mut shotgun = Shotgun::load(0, 1);
        shotgun.magazine.reveal(0, Round::Blank, true);
        let mut state = base_state(shotgun, vec![], vec![]);
        state.next_event = Event::new(true, Action::ShootSelf);
        let children = get_child_states(&state);
        assert_eq!(children.len(), 1);
        assert!(children[0].next_event.is_player_turn);
    }

    #[test]
    fn adrenalin_requires_a_stealable_opponent_item() {
        let state = base_state(Shotgun::load(1, 1), vec![Item::Adrenalin], vec![]);
        let actions = player_filter(&state);
        assert!(!actions.contains(&Action::UseItem(Item::Adrenalin)));

        let state = base_state(Shotgun::load(1, 1), vec![Item::Adrenalin], vec![Item::Cigarette]);
        let actions = player_filter(&state);
        assert!(actions.contains(&Action::UseItem(Item::Adrenalin)));
    }

    #[test]
    fn adrenalin_consumes_opponent_item_and_applies_its_effect() {
        let mut state = base_state(Shotgun::load(1, 1), vec![Item::Adrenalin], vec![Item::Cigarette]);
        state.player.lives = 2;
        state.next_event = Event::new(true, Action::UseItem(Item::Adrenalin));
        let children = get_child_states(&state);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].player.lives, 3);
        assert_eq!(children[0].dealer.item_count(Item::Cigarette), 0);
    }

    #[test]
    fn max_depth_counts_items_and_rounds() {
        let state = base_state(Shotgun::load(1, 1), vec![Item::Saw], vec![Item::Beer, Item::Glass]);
        assert_eq!(get_max_depth(&state), 2 * (1 + 2 + 2));
    }
}
