//! Feature adjacency across tile edges.
//!
//! Two features on neighbouring tiles are adjacent when they own facing
//! edge slots. Cloisters own no slots and are never edge-adjacent to
//! anything. All lookups go through the board's cell index.

use super::feature::{facing_slot, Side};
use super::state::Board;
use super::tile::{shift, Pos};

/// A feature on a placed tile.
pub type FeatureRef = (Pos, usize);

/// Returns the feature across the edge from `slot` of the tile at `pos`,
/// or `None` if that neighbouring cell is empty or off the coordinate space.
pub fn feature_across(board: &Board, pos: Pos, slot: usize) -> Option<FeatureRef> {
    let (dx, dy) = Side::of_slot(slot).offset();
    let neighbour = shift(pos, dx, dy)?;
    let tile = board.tile(neighbour)?;
    tile.feature_at_slot(facing_slot(slot)).map(|f| (neighbour, f))
}

/// Features on neighbouring tiles touching a feature, one entry per
/// connected slot (duplicates are possible when a feature spans a side).
pub fn adjacent_features(board: &Board, pos: Pos, feature: usize) -> Vec<FeatureRef> {
    let Some(tile) = board.tile(pos) else {
        return Vec::new();
    };
    tile.feature_slots(feature)
        .slots()
        .filter_map(|slot| feature_across(board, pos, slot))
        .collect()
}
