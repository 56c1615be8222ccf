//! Marker lifecycle: placement legality, claiming, and release.
//!
//! A marker is created when placed, never moves, and is destroyed when the
//! structure it claims is scored. The tile's marker slot is the only place
//! a live marker is stored.

use tracing::{info, warn};

use super::claims::claim_structure;
use crate::board::{Board, Marker, UNCLAIMED};

/// Why a marker could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("player {player} already has all {cap} markers in play")]
    MarkerCapReached { player: usize, cap: usize },

    #[error("no tile at ({0}, {1})")]
    UnknownTile(i32, i32),

    #[error("tile at ({x}, {y}) has no feature {feature}")]
    NoSuchFeature { x: i32, y: i32, feature: usize },

    #[error("tile at ({0}, {1}) already holds a marker")]
    TileHasMarker(i32, i32),

    #[error("feature is already part of claim group {0}")]
    AlreadyClaimed(u32),

    #[error("markers may only go on the tile placed this turn, not ({0}, {1})")]
    NotCurrentTile(i32, i32),
}

/// Number of markers the player has on the board.
pub fn markers_in_play(board: &Board, player: usize) -> usize {
    board.markers_of(player)
}

/// Checks whether a marker may be placed, without touching the board.
pub fn check_marker(board: &Board, marker: &Marker, cap: usize) -> Result<(), ClaimError> {
    if markers_in_play(board, marker.owner) >= cap {
        return Err(ClaimError::MarkerCapReached { player: marker.owner, cap });
    }
    let Some(tile) = board.tile(marker.pos()) else {
        return Err(ClaimError::UnknownTile(marker.x, marker.y));
    };
    let Some(&group) = tile.claims.get(marker.feature) else {
        return Err(ClaimError::NoSuchFeature { x: marker.x, y: marker.y, feature: marker.feature });
    };
    if tile.marker.is_some() {
        return Err(ClaimError::TileHasMarker(marker.x, marker.y));
    }
    if group != UNCLAIMED {
        return Err(ClaimError::AlreadyClaimed(group));
    }
    Ok(())
}

/// Places a marker, claiming the whole structure under it with a fresh group.
///
/// Returns the marker as stored, with its claim group filled in.
pub fn place(board: &mut Board, marker: Marker, cap: usize) -> Result<Marker, ClaimError> {
    check_marker(board, &marker, cap)?;

    let group = claim_structure(board, marker.pos(), marker.feature).ok_or(
        ClaimError::NoSuchFeature { x: marker.x, y: marker.y, feature: marker.feature },
    )?;
    let placed = Marker { claim_group: group, ..marker };
    if let Some(tile) = board.tile_mut(marker.pos()) {
        tile.marker = Some(placed);
    }
    info!(
        player = placed.owner,
        x = placed.x,
        y = placed.y,
        feature = placed.feature,
        group,
        "placed marker"
    );
    Ok(placed)
}

/// Removes a live marker from its tile and returns it.
///
/// A marker whose tile is missing, or whose tile holds a different marker,
/// indicates corrupted state: it is logged and treated as orphaned.
pub fn release(board: &mut Board, marker: &Marker) -> Option<Marker> {
    let Some(tile) = board.tile_mut(marker.pos()) else {
        warn!(?marker, "consistency fault: marker references a missing tile");
        return None;
    };
    match tile.marker {
        Some(held) if held.feature == marker.feature && held.owner == marker.owner => {
            tile.marker = None;
            Some(held)
        }
        _ => {
            warn!(?marker, held = ?tile.marker, "consistency fault: tile does not hold marker");
            None
        }
    }
}
