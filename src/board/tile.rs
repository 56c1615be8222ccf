//! Tile kinds and placed tiles.
//!
//! The 24 kinds of the base set are enumerated `A` through `X`. Their
//! feature layout (slot masks, shields, and which farms touch which city)
//! lives in a compile-time table indexed by the `TileKind` discriminant.
//! A city or road that runs through several sides of one tile is a single
//! feature, so a tile's internal connections are fixed by this table.

use serde::{Deserialize, Serialize};

use super::feature::{Feature, FeatureType, Side, SlotMask, SLOT_COUNT};
use super::marker::Marker;

/// Identifier of one connected, claimed structure. Zero means unclaimed.
pub type ClaimGroup = u32;

/// The claim group value of a feature nobody has claimed.
pub const UNCLAIMED: ClaimGroup = 0;

/// A board cell.
pub type Pos = (i32, i32);

/// Offsets a cell, or `None` past the edge of the coordinate space.
pub fn shift(pos: Pos, dx: i32, dy: i32) -> Option<Pos> {
    Some((pos.0.checked_add(dx)?, pos.1.checked_add(dy)?))
}

/// Number of tile kinds in the base set.
pub const TILE_KIND_COUNT: usize = 24;

/// Number of tiles in the base set, starting tile included.
pub const TILE_SET_SIZE: usize = 72;

/// A tile kind from the base set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    A = 0,  // cloister, road south
    B = 1,  // cloister
    C = 2,  // city on all sides, shield
    D = 3,  // city north, road east-west (starting tile)
    E = 4,  // city north
    F = 5,  // city east-west, shield
    G = 6,  // city north-south
    H = 7,  // separate cities north and south
    I = 8,  // separate cities north and west
    J = 9,  // city north, road east-south
    K = 10, // city north, road south-west
    L = 11, // city north, road junction east-south-west
    M = 12, // city north-west, shield
    N = 13, // city north-west
    O = 14, // city north-west, shield, road east-south
    P = 15, // city north-west, road east-south
    Q = 16, // city north-east-west, shield
    R = 17, // city north-east-west
    S = 18, // city north-east-west, shield, road south
    T = 19, // city north-east-west, road south
    U = 20, // road north-south
    V = 21, // road south-west
    W = 22, // road junction east-south-west
    X = 23, // crossroads
}

/// All tile kinds in index order.
pub const ALL_TILE_KINDS: [TileKind; TILE_KIND_COUNT] = [
    TileKind::A, TileKind::B, TileKind::C, TileKind::D,
    TileKind::E, TileKind::F, TileKind::G, TileKind::H,
    TileKind::I, TileKind::J, TileKind::K, TileKind::L,
    TileKind::M, TileKind::N, TileKind::O, TileKind::P,
    TileKind::Q, TileKind::R, TileKind::S, TileKind::T,
    TileKind::U, TileKind::V, TileKind::W, TileKind::X,
];

/// The tile every game starts from, placed at the origin unrotated.
pub const STARTING_TILE: TileKind = TileKind::D;

impl TileKind {
    /// Returns the letter naming this kind.
    pub fn abbr(self) -> char {
        TILE_INFO[self as usize].abbr
    }

    /// Returns how many copies of this kind the base set contains.
    pub fn count(self) -> usize {
        TILE_INFO[self as usize].count
    }

    /// Returns the unrotated feature list.
    pub fn features(self) -> &'static [Feature] {
        TILE_INFO[self as usize].features
    }

    /// Returns the farm feature indices touching the given city feature.
    pub fn city_farms(self, city: usize) -> &'static [usize] {
        TILE_INFO[self as usize]
            .city_farms
            .iter()
            .find(|(c, _)| *c == city)
            .map(|(_, farms)| *farms)
            .unwrap_or(&[])
    }

    /// Parses a tile kind from its letter.
    pub fn from_abbr(c: char) -> Option<TileKind> {
        ALL_TILE_KINDS.iter().copied().find(|k| k.abbr() == c)
    }
}

/// Builds the full base set (starting tile excluded) in catalogue order.
pub fn standard_tile_set() -> Vec<TileKind> {
    let mut set = Vec::with_capacity(TILE_SET_SIZE - 1);
    for kind in ALL_TILE_KINDS {
        let copies = if kind == STARTING_TILE { kind.count() - 1 } else { kind.count() };
        set.extend(std::iter::repeat(kind).take(copies));
    }
    set
}

/// Static layout of a tile kind.
pub struct TileInfo {
    pub abbr: char,
    pub count: usize,
    pub features: &'static [Feature],
    /// For each city feature, the farm features on the same tile touching it.
    pub city_farms: &'static [(usize, &'static [usize])],
}

const fn mask(parts: &[SlotMask]) -> SlotMask {
    let mut acc = SlotMask::EMPTY;
    let mut i = 0;
    while i < parts.len() {
        acc = acc.or(parts[i]);
        i += 1;
    }
    acc
}

const NORTH: SlotMask = SlotMask::N;
const EAST: SlotMask = SlotMask::E;
const SOUTH: SlotMask = SlotMask::S;
const WEST: SlotMask = SlotMask::W;
const N_W: SlotMask = SlotMask::N_W;
const N_C: SlotMask = SlotMask::N_C;
const N_E: SlotMask = SlotMask::N_E;
const E_N: SlotMask = SlotMask::E_N;
const E_C: SlotMask = SlotMask::E_C;
const E_S: SlotMask = SlotMask::E_S;
const S_E: SlotMask = SlotMask::S_E;
const S_C: SlotMask = SlotMask::S_C;
const S_W: SlotMask = SlotMask::S_W;
const W_S: SlotMask = SlotMask::W_S;
const W_C: SlotMask = SlotMask::W_C;
const W_N: SlotMask = SlotMask::W_N;

/// Compile-time lookup table: index by `TileKind as usize`.
pub static TILE_INFO: [TileInfo; TILE_KIND_COUNT] = [
    TileInfo {
        abbr: 'A',
        count: 2,
        features: &[
            Feature::cloister(),
            Feature::road(S_C),
            Feature::farm(mask(&[NORTH, EAST, WEST, S_E, S_W])),
        ],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'B',
        count: 4,
        features: &[Feature::cloister(), Feature::farm(SlotMask::ALL)],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'C',
        count: 1,
        features: &[Feature::shielded_city(SlotMask::ALL)],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'D',
        count: 4,
        features: &[
            Feature::city(NORTH),
            Feature::road(mask(&[E_C, W_C])),
            Feature::farm(mask(&[E_N, W_N])),
            Feature::farm(mask(&[E_S, SOUTH, W_S])),
        ],
        city_farms: &[(0, &[2])],
    },
    TileInfo {
        abbr: 'E',
        count: 5,
        features: &[Feature::city(NORTH), Feature::farm(mask(&[EAST, SOUTH, WEST]))],
        city_farms: &[(0, &[1])],
    },
    TileInfo {
        abbr: 'F',
        count: 2,
        features: &[
            Feature::shielded_city(mask(&[EAST, WEST])),
            Feature::farm(NORTH),
            Feature::farm(SOUTH),
        ],
        city_farms: &[(0, &[1, 2])],
    },
    TileInfo {
        abbr: 'G',
        count: 1,
        features: &[
            Feature::city(mask(&[NORTH, SOUTH])),
            Feature::farm(EAST),
            Feature::farm(WEST),
        ],
        city_farms: &[(0, &[1, 2])],
    },
    TileInfo {
        abbr: 'H',
        count: 3,
        features: &[
            Feature::city(NORTH),
            Feature::city(SOUTH),
            Feature::farm(mask(&[EAST, WEST])),
        ],
        city_farms: &[(0, &[2]), (1, &[2])],
    },
    TileInfo {
        abbr: 'I',
        count: 2,
        features: &[
            Feature::city(NORTH),
            Feature::city(WEST),
            Feature::farm(mask(&[EAST, SOUTH])),
        ],
        city_farms: &[(0, &[2]), (1, &[2])],
    },
    TileInfo {
        abbr: 'J',
        count: 3,
        features: &[
            Feature::city(NORTH),
            Feature::road(mask(&[E_C, S_C])),
            Feature::farm(mask(&[E_N, S_W, WEST])),
            Feature::farm(mask(&[E_S, S_E])),
        ],
        city_farms: &[(0, &[2])],
    },
    TileInfo {
        abbr: 'K',
        count: 3,
        features: &[
            Feature::city(NORTH),
            Feature::road(mask(&[S_C, W_C])),
            Feature::farm(mask(&[EAST, S_E, W_N])),
            Feature::farm(mask(&[S_W, W_S])),
        ],
        city_farms: &[(0, &[2])],
    },
    TileInfo {
        abbr: 'L',
        count: 3,
        features: &[
            Feature::city(NORTH),
            Feature::road(E_C),
            Feature::road(S_C),
            Feature::road(W_C),
            Feature::farm(mask(&[E_N, W_N])),
            Feature::farm(mask(&[E_S, S_E])),
            Feature::farm(mask(&[S_W, W_S])),
        ],
        city_farms: &[(0, &[4])],
    },
    TileInfo {
        abbr: 'M',
        count: 2,
        features: &[
            Feature::shielded_city(mask(&[NORTH, WEST])),
            Feature::farm(mask(&[EAST, SOUTH])),
        ],
        city_farms: &[(0, &[1])],
    },
    TileInfo {
        abbr: 'N',
        count: 3,
        features: &[
            Feature::city(mask(&[NORTH, WEST])),
            Feature::farm(mask(&[EAST, SOUTH])),
        ],
        city_farms: &[(0, &[1])],
    },
    TileInfo {
        abbr: 'O',
        count: 2,
        features: &[
            Feature::shielded_city(mask(&[NORTH, WEST])),
            Feature::road(mask(&[E_C, S_C])),
            Feature::farm(mask(&[E_N, S_W])),
            Feature::farm(mask(&[E_S, S_E])),
        ],
        city_farms: &[(0, &[2])],
    },
    TileInfo {
        abbr: 'P',
        count: 3,
        features: &[
            Feature::city(mask(&[NORTH, WEST])),
            Feature::road(mask(&[E_C, S_C])),
            Feature::farm(mask(&[E_N, S_W])),
            Feature::farm(mask(&[E_S, S_E])),
        ],
        city_farms: &[(0, &[2])],
    },
    TileInfo {
        abbr: 'Q',
        count: 1,
        features: &[
            Feature::shielded_city(mask(&[NORTH, EAST, WEST])),
            Feature::farm(SOUTH),
        ],
        city_farms: &[(0, &[1])],
    },
    TileInfo {
        abbr: 'R',
        count: 3,
        features: &[
            Feature::city(mask(&[NORTH, EAST, WEST])),
            Feature::farm(SOUTH),
        ],
        city_farms: &[(0, &[1])],
    },
    TileInfo {
        abbr: 'S',
        count: 2,
        features: &[
            Feature::shielded_city(mask(&[NORTH, EAST, WEST])),
            Feature::road(S_C),
            Feature::farm(S_W),
            Feature::farm(S_E),
        ],
        city_farms: &[(0, &[2, 3])],
    },
    TileInfo {
        abbr: 'T',
        count: 1,
        features: &[
            Feature::city(mask(&[NORTH, EAST, WEST])),
            Feature::road(S_C),
            Feature::farm(S_W),
            Feature::farm(S_E),
        ],
        city_farms: &[(0, &[2, 3])],
    },
    TileInfo {
        abbr: 'U',
        count: 8,
        features: &[
            Feature::road(mask(&[N_C, S_C])),
            Feature::farm(mask(&[N_E, EAST, S_E])),
            Feature::farm(mask(&[S_W, WEST, N_W])),
        ],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'V',
        count: 9,
        features: &[
            Feature::road(mask(&[S_C, W_C])),
            Feature::farm(mask(&[NORTH, EAST, S_E, W_N])),
            Feature::farm(mask(&[S_W, W_S])),
        ],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'W',
        count: 4,
        features: &[
            Feature::road(E_C),
            Feature::road(S_C),
            Feature::road(W_C),
            Feature::farm(mask(&[W_N, NORTH, E_N])),
            Feature::farm(mask(&[E_S, S_E])),
            Feature::farm(mask(&[S_W, W_S])),
        ],
        city_farms: &[],
    },
    TileInfo {
        abbr: 'X',
        count: 1,
        features: &[
            Feature::road(N_C),
            Feature::road(E_C),
            Feature::road(S_C),
            Feature::road(W_C),
            Feature::farm(mask(&[N_E, E_N])),
            Feature::farm(mask(&[E_S, S_E])),
            Feature::farm(mask(&[S_W, W_S])),
            Feature::farm(mask(&[W_N, N_W])),
        ],
        city_farms: &[],
    },
];

/// A proposed tile position: kind, cell, and clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub kind: TileKind,
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
}

impl Placement {
    pub fn new(kind: TileKind, x: i32, y: i32, rotation: u8) -> Self {
        Placement { kind, x, y, rotation: rotation % 4 }
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }
}

/// A tile on (or about to go on) the board.
///
/// The shape is fixed once placed; only `claims` and `marker` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
    /// Claim group per feature, parallel to `kind.features()`.
    pub claims: Vec<ClaimGroup>,
    pub marker: Option<Marker>,
}

impl Tile {
    /// Creates an unclaimed tile from a placement.
    pub fn new(placement: Placement) -> Self {
        Tile {
            kind: placement.kind,
            x: placement.x,
            y: placement.y,
            rotation: placement.rotation % 4,
            claims: vec![UNCLAIMED; placement.kind.features().len()],
            marker: None,
        }
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.kind, self.x, self.y, self.rotation)
    }

    pub fn feature_count(&self) -> usize {
        self.claims.len()
    }

    pub fn feature_type(&self, feature: usize) -> FeatureType {
        self.kind.features()[feature].kind
    }

    pub fn has_shield(&self, feature: usize) -> bool {
        self.kind.features()[feature].shield
    }

    /// Slots owned by a feature after rotation.
    pub fn feature_slots(&self, feature: usize) -> SlotMask {
        self.kind.features()[feature].slots.rotated(self.rotation)
    }

    /// Returns the feature owning a (rotated) edge slot.
    pub fn feature_at_slot(&self, slot: usize) -> Option<usize> {
        debug_assert!(slot < SLOT_COUNT);
        (0..self.feature_count()).find(|&f| self.feature_slots(f).contains(slot))
    }

    /// The terrain shown on one side, read from its centre slot.
    pub fn edge(&self, side: Side) -> Option<FeatureType> {
        self.feature_at_slot(side.centre_slot())
            .map(|f| self.feature_type(f))
    }

    /// Cell across the given side, or `None` at the edge of the coordinate space.
    pub fn neighbour_pos(&self, side: Side) -> Option<Pos> {
        let (dx, dy) = side.offset();
        shift(self.pos(), dx, dy)
    }
}
