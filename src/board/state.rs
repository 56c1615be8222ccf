//! Board state.
//!
//! Owns every placed tile, a cell index for O(1) lookup, and the per-board
//! claim-group counter. The board is the single source of truth for
//! markers: each tile holds at most one, and the marker collection shown to
//! clients is derived from the tile slots.

use std::collections::HashMap;

use super::feature::ALL_SIDES;
use super::marker::Marker;
use super::tile::{shift, ClaimGroup, Placement, Pos, Tile, STARTING_TILE, UNCLAIMED};

/// All placed tiles plus claim bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Tiles in placement order.
    tiles: Vec<Tile>,
    /// Cell -> index into `tiles`.
    index: HashMap<Pos, usize>,
    /// Next claim group to hand out. Never reused within a board.
    next_claim: ClaimGroup,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Board {
            tiles: Vec::new(),
            index: HashMap::new(),
            next_claim: UNCLAIMED + 1,
        }
    }

    /// Creates a board holding only the starting tile at the origin.
    pub fn with_starting_tile() -> Self {
        let mut board = Board::new();
        board.insert(Tile::new(Placement::new(STARTING_TILE, 0, 0, 0)));
        board
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in the order they were placed.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.index.get(&pos).map(|&i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        match self.index.get(&pos) {
            Some(&i) => Some(&mut self.tiles[i]),
            None => None,
        }
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.index.contains_key(&pos)
    }

    /// Inserts a tile. Returns false if the cell is already occupied.
    ///
    /// Does not check edge compatibility; run the placement validator first.
    pub fn insert(&mut self, tile: Tile) -> bool {
        let pos = tile.pos();
        if self.index.contains_key(&pos) {
            return false;
        }
        self.index.insert(pos, self.tiles.len());
        self.tiles.push(tile);
        true
    }

    /// Hands out a fresh claim group.
    pub fn allocate_claim(&mut self) -> ClaimGroup {
        let group = self.next_claim;
        self.next_claim += 1;
        group
    }

    /// The claim group the next allocation will return.
    pub fn peek_next_claim(&self) -> ClaimGroup {
        self.next_claim
    }

    /// Claim group of one feature, or `None` if the tile or feature is missing.
    pub fn claim(&self, pos: Pos, feature: usize) -> Option<ClaimGroup> {
        self.tile(pos).and_then(|t| t.claims.get(feature).copied())
    }

    /// Relabels one feature, keeping a marker on that feature in step.
    pub fn set_claim(&mut self, pos: Pos, feature: usize, group: ClaimGroup) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.claims[feature] = group;
            if let Some(marker) = tile.marker.as_mut() {
                if marker.feature == feature {
                    marker.claim_group = group;
                }
            }
        }
    }

    /// Every marker on the board, in tile placement order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.tiles.iter().filter_map(|t| t.marker.as_ref())
    }

    /// Number of markers the player currently has on the board.
    pub fn markers_of(&self, player: usize) -> usize {
        self.markers().filter(|m| m.owner == player).count()
    }

    /// Number of occupied cells among the 8 surrounding `pos`.
    pub fn occupied_around(&self, pos: Pos) -> usize {
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                if shift(pos, dx, dy).is_some_and(|p| self.is_occupied(p)) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Empty cells orthogonally adjacent to at least one tile, sorted.
    pub fn frontier(&self) -> Vec<Pos> {
        let mut cells: Vec<Pos> = self
            .tiles
            .iter()
            .flat_map(|t| ALL_SIDES.iter().filter_map(move |&side| t.neighbour_pos(side)))
            .filter(|p| !self.is_occupied(*p))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tile::TileKind;

    #[test]
    fn starting_board_has_one_unclaimed_tile() {
        let board = Board::with_starting_tile();
        assert_eq!(board.len(), 1);
        let tile = board.tile((0, 0)).unwrap();
        assert_eq!(tile.kind, STARTING_TILE);
        assert!(tile.claims.iter().all(|&c| c == UNCLAIMED));
        assert_eq!(board.markers().count(), 0);
    }

    #[test]
    fn insert_rejects_occupied_cell() {
        let mut board = Board::with_starting_tile();
        assert!(!board.insert(Tile::new(Placement::new(TileKind::U, 0, 0, 0))));
        assert!(board.insert(Tile::new(Placement::new(TileKind::U, 1, 0, 1))));
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn claims_are_never_reused() {
        let mut board = Board::new();
        let a = board.allocate_claim();
        let b = board.allocate_claim();
        assert_ne!(a, UNCLAIMED);
        assert!(b > a);
        assert_eq!(board.peek_next_claim(), b + 1);
    }

    #[test]
    fn set_claim_updates_marker() {
        let mut board = Board::with_starting_tile();
        board.tile_mut((0, 0)).unwrap().marker =
            Some(Marker { owner: 0, x: 0, y: 0, feature: 1, claim_group: 3 });
        board.set_claim((0, 0), 1, 9);
        assert_eq!(board.claim((0, 0), 1), Some(9));
        assert_eq!(board.markers().next().unwrap().claim_group, 9);
        board.set_claim((0, 0), 0, 4);
        assert_eq!(board.markers().next().unwrap().claim_group, 9);
    }

    #[test]
    fn frontier_of_start_tile() {
        let board = Board::with_starting_tile();
        assert_eq!(board.frontier(), vec![(-1, 0), (0, -1), (0, 1), (1, 0)]);
    }

    #[test]
    fn occupied_around_counts_diagonals() {
        let mut board = Board::with_starting_tile();
        board.insert(Tile::new(Placement::new(TileKind::B, 1, 1, 0)));
        board.insert(Tile::new(Placement::new(TileKind::B, 1, 0, 0)));
        assert_eq!(board.occupied_around((0, 0)), 2);
        assert_eq!(board.occupied_around((1, 1)), 2);
    }
}
