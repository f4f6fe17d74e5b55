//! The closed catalog of single-use items.
//!
//! Per-type multiplicity caps are enforced by the external drawer (see
//! [`crate::collaborators::ItemDrawer`]) but are exposed here since several
//! tests and the evaluator's weight table key off them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Item {
    Cigarette,
    Glass,
    Saw,
    Handcuffs,
    Phone,
    Beer,
    Pills,
    Inverter,
    Adrenalin,
}

impl Item {
    pub const ALL: [Item; 9] = [
        Item::Cigarette,
        Item::Glass,
        Item::Saw,
        Item::Handcuffs,
        Item::Phone,
        Item::Beer,
        Item::Pills,
        Item::Inverter,
        Item::Adrenalin,
    ];

    /// Maximum number of copies of this item a drawer is allowed to hand a
    /// single participant. Not enforced by the core; informational only.
    pub fn max_multiplicity(self) -> usize {
        match self {
            Item::Cigarette => 1,
            Item::Glass => 3,
            Item::Saw => 3,
            Item::Handcuffs => 1,
            Item::Phone => 1,
            Item::Beer => 2,
            Item::Pills => 1,
            Item::Inverter => 8,
            Item::Adrenalin => 2,
        }
    }
}
