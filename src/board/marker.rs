//! Marker pieces.
//!
//! A marker is a player's ownership token sitting on one feature of one
//! tile. It lives in that tile's marker slot; the board derives the
//! marker collection shown to clients from the slots.

use serde::{Deserialize, Serialize};

use super::tile::{ClaimGroup, Pos};

/// Markers each player owns unless configured otherwise.
pub const MARKERS_PER_PLAYER: usize = 7;

/// A player's marker on a tile feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    /// Player slot of the owner.
    pub owner: usize,
    pub x: i32,
    pub y: i32,
    /// Feature index on the tile at `(x, y)`.
    pub feature: usize,
    /// Group claimed by this marker, kept in step with the tile's claims.
    pub claim_group: ClaimGroup,
}

impl Marker {
    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }
}

/// Where a player asks to put a marker: a tile cell and a feature index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerSpot {
    pub x: i32,
    pub y: i32,
    pub feature: usize,
}

impl MarkerSpot {
    pub fn new(x: i32, y: i32, feature: usize) -> Self {
        MarkerSpot { x, y, feature }
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }

    /// Builds an unplaced marker for `owner`; the claim group is assigned on placement.
    pub fn marker_for(&self, owner: usize) -> Marker {
        Marker { owner, x: self.x, y: self.y, feature: self.feature, claim_group: 0 }
    }
}
