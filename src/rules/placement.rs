//! Placement validation.
//!
//! A tile may go on an empty cell that touches at least one placed tile,
//! provided every touching side shows the same terrain as the neighbour's
//! facing side. Validation never mutates the board.

use crate::board::{Board, FeatureType, Placement, Side, Tile, TileKind, ALL_SIDES};

/// Why a placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("cell ({0}, {1}) is already occupied")]
    Occupied(i32, i32),

    #[error("cell ({0}, {1}) does not touch any placed tile")]
    NoNeighbour(i32, i32),

    #[error("{side:?} edge shows {ours:?} but the neighbour shows {theirs:?}")]
    EdgeMismatch {
        side: Side,
        ours: Option<FeatureType>,
        theirs: Option<FeatureType>,
    },

    #[error("expected tile {expected}, got {got}")]
    WrongTile { expected: char, got: char },
}

/// Checks a candidate tile against the board.
pub fn check_placement(board: &Board, candidate: &Tile) -> Result<(), PlacementError> {
    let (x, y) = candidate.pos();
    if board.is_occupied((x, y)) {
        return Err(PlacementError::Occupied(x, y));
    }

    let mut has_neighbour = false;
    for side in ALL_SIDES {
        let Some(neighbour) = candidate.neighbour_pos(side).and_then(|p| board.tile(p)) else {
            continue;
        };
        has_neighbour = true;
        let ours = candidate.edge(side);
        let theirs = neighbour.edge(side.opposite());
        if ours != theirs {
            return Err(PlacementError::EdgeMismatch { side, ours, theirs });
        }
    }

    if !has_neighbour {
        return Err(PlacementError::NoNeighbour(x, y));
    }
    Ok(())
}

/// Returns true if the candidate may be placed.
pub fn validate(board: &Board, candidate: &Tile) -> bool {
    check_placement(board, candidate).is_ok()
}

/// Every legal placement of a tile kind, sorted by cell then rotation.
pub fn legal_placements(board: &Board, kind: TileKind) -> Vec<Placement> {
    let mut legal = Vec::new();
    for (x, y) in board.frontier() {
        for rotation in 0..4 {
            let placement = Placement::new(kind, x, y, rotation);
            if validate(board, &Tile::new(placement)) {
                legal.push(placement);
            }
        }
    }
    legal.sort();
    legal
}

/// Returns true if the tile kind fits anywhere on the board.
pub fn has_legal_placement(board: &Board, kind: TileKind) -> bool {
    board.frontier().into_iter().any(|(x, y)| {
        (0..4).any(|rotation| validate(board, &Tile::new(Placement::new(kind, x, y, rotation))))
    })
}
