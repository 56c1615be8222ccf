//! Feature types and edge-slot geometry.
//!
//! Every tile side is split into three slots (two corners and a centre), so
//! a tile has 12 edge slots numbered clockwise from the north-west corner.
//! Features own a set of slots; two features on neighbouring tiles connect
//! when they own facing slots.

use serde::{Deserialize, Serialize};

/// Number of edge slots around a tile.
pub const SLOT_COUNT: usize = 12;

/// The kind of terrain a feature represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureType {
    Road,
    City,
    Cloister,
    Farm,
}

impl FeatureType {
    /// Roads and cities are the features that complete through tile edges.
    pub const fn is_edge_scored(self) -> bool {
        matches!(self, FeatureType::Road | FeatureType::City)
    }
}

/// One side of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

/// All sides in clockwise order.
pub const ALL_SIDES: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

impl Side {
    /// Returns the side facing this one across a shared edge.
    pub const fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Board offset of the neighbouring cell across this side.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    /// The slot in the middle of this side.
    pub const fn centre_slot(self) -> usize {
        self as usize * 3 + 1
    }

    /// Returns the side a slot sits on.
    pub const fn of_slot(slot: usize) -> Side {
        ALL_SIDES[slot / 3]
    }
}

/// Returns the slot on the neighbouring tile that touches `slot`.
///
/// Corners mirror across the shared edge: the north side's west corner
/// meets the south side's west corner of the tile above.
pub const fn facing_slot(slot: usize) -> usize {
    let side = slot / 3;
    let k = slot % 3;
    ((side + 2) % 4) * 3 + (2 - k)
}

/// A set of edge slots stored as a 12-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SlotMask(pub u16);

impl SlotMask {
    pub const EMPTY: SlotMask = SlotMask(0);
    pub const ALL: SlotMask = SlotMask(0x0FFF);

    pub const N_W: SlotMask = SlotMask(1 << 0);
    pub const N_C: SlotMask = SlotMask(1 << 1);
    pub const N_E: SlotMask = SlotMask(1 << 2);
    pub const E_N: SlotMask = SlotMask(1 << 3);
    pub const E_C: SlotMask = SlotMask(1 << 4);
    pub const E_S: SlotMask = SlotMask(1 << 5);
    pub const S_E: SlotMask = SlotMask(1 << 6);
    pub const S_C: SlotMask = SlotMask(1 << 7);
    pub const S_W: SlotMask = SlotMask(1 << 8);
    pub const W_S: SlotMask = SlotMask(1 << 9);
    pub const W_C: SlotMask = SlotMask(1 << 10);
    pub const W_N: SlotMask = SlotMask(1 << 11);

    /// Whole sides.
    pub const N: SlotMask = SlotMask(0b111);
    pub const E: SlotMask = SlotMask(0b111 << 3);
    pub const S: SlotMask = SlotMask(0b111 << 6);
    pub const W: SlotMask = SlotMask(0b111 << 9);

    /// Union of two masks, usable in const tables.
    pub const fn or(self, other: SlotMask) -> SlotMask {
        SlotMask(self.0 | other.0)
    }

    pub const fn contains(self, slot: usize) -> bool {
        self.0 & (1 << slot) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Rotates the mask clockwise by `quarter_turns` quarter turns.
    pub const fn rotated(self, quarter_turns: u8) -> SlotMask {
        let shift = (quarter_turns % 4) as u32 * 3;
        if shift == 0 {
            return self;
        }
        let bits = self.0 as u32;
        let rotated = ((bits << shift) | (bits >> (SLOT_COUNT as u32 - shift))) & 0x0FFF;
        SlotMask(rotated as u16)
    }

    /// Iterates the slot indices set in this mask, lowest first.
    pub fn slots(self) -> impl Iterator<Item = usize> {
        (0..SLOT_COUNT).filter(move |&s| self.contains(s))
    }
}

/// A feature as laid out on an unrotated tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub kind: FeatureType,
    pub slots: SlotMask,
    /// Cities only: carries a shield worth extra points.
    pub shield: bool,
}

impl Feature {
    pub const fn road(slots: SlotMask) -> Self {
        Feature { kind: FeatureType::Road, slots, shield: false }
    }

    pub const fn city(slots: SlotMask) -> Self {
        Feature { kind: FeatureType::City, slots, shield: false }
    }

    pub const fn shielded_city(slots: SlotMask) -> Self {
        Feature { kind: FeatureType::City, slots, shield: true }
    }

    pub const fn farm(slots: SlotMask) -> Self {
        Feature { kind: FeatureType::Farm, slots, shield: false }
    }

    pub const fn cloister() -> Self {
        Feature { kind: FeatureType::Cloister, slots: SlotMask::EMPTY, shield: false }
    }
}
