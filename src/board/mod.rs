//! Board representation.
//!
//! Contains the tile catalogue, edge-slot geometry, markers, feature
//! adjacency, and the board state that owns all placed tiles.

pub mod adjacency;
pub mod feature;
pub mod marker;
pub mod state;
pub mod tile;

pub use adjacency::{adjacent_features, feature_across, FeatureRef};
pub use feature::{facing_slot, Feature, FeatureType, Side, SlotMask, ALL_SIDES, SLOT_COUNT};
pub use marker::{Marker, MarkerSpot, MARKERS_PER_PLAYER};
pub use state::Board;
pub use tile::{
    shift, standard_tile_set, ClaimGroup, Placement, Pos, Tile, TileKind, ALL_TILE_KINDS,
    STARTING_TILE, TILE_INFO, TILE_KIND_COUNT, TILE_SET_SIZE, UNCLAIMED,
};
