//! Feature graph traversal and structure values.
//!
//! A structure is the connected set of same-type features reachable through
//! facing edge slots. Its completion value is signed: positive means the
//! structure is closed and is worth that many points, negative means it is
//! still open and its absolute value is what it is worth so far.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::board::{feature_across, Board, FeatureRef, FeatureType, Pos};

/// Points for a completed cloister (the cloister tile and its 8 neighbours).
pub const CLOISTER_VALUE: i32 = 9;

/// A connected road, city, farm or cloister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub kind: FeatureType,
    /// Member features in discovery order, starting feature first.
    pub members: Vec<FeatureRef>,
    /// Distinct tiles the structure touches.
    pub tiles: BTreeSet<Pos>,
    pub shields: usize,
    /// Member slots facing an empty cell.
    pub open_slots: usize,
}

impl Structure {
    /// Every edge slot of every member faces a placed tile.
    pub fn is_closed(&self) -> bool {
        self.open_slots == 0
    }
}

/// Collects the structure containing a feature by breadth-first search.
///
/// Returns `None` if the tile or feature does not exist.
pub fn trace(board: &Board, pos: Pos, feature: usize) -> Option<Structure> {
    let start = board.tile(pos)?;
    if feature >= start.feature_count() {
        return None;
    }

    let kind = start.feature_type(feature);
    let mut structure = Structure {
        kind,
        members: Vec::new(),
        tiles: BTreeSet::new(),
        shields: 0,
        open_slots: 0,
    };
    let mut seen: HashSet<FeatureRef> = HashSet::new();
    let mut queue: VecDeque<FeatureRef> = VecDeque::new();
    seen.insert((pos, feature));
    queue.push_back((pos, feature));

    while let Some((at, f)) = queue.pop_front() {
        let Some(tile) = board.tile(at) else {
            continue;
        };
        structure.members.push((at, f));
        structure.tiles.insert(at);
        if tile.has_shield(f) {
            structure.shields += 1;
        }
        for slot in tile.feature_slots(f).slots() {
            match feature_across(board, at, slot) {
                Some(next) => {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
                None => structure.open_slots += 1,
            }
        }
    }

    Some(structure)
}

/// Signed completion value of the structure containing a feature.
///
/// Roads score 1 per tile. Cities score 2 per tile and per shield when
/// closed, 1 per tile and per shield when open. Cloisters are closed when
/// all 8 surrounding cells are occupied and are worth `CLOISTER_VALUE`;
/// otherwise 1 plus the occupied neighbours. Farms have no completion value.
pub fn feature_value(board: &Board, pos: Pos, feature: usize) -> i32 {
    let Some(tile) = board.tile(pos) else {
        return 0;
    };
    if feature >= tile.feature_count() {
        return 0;
    }

    match tile.feature_type(feature) {
        FeatureType::Cloister => {
            let occupied = 1 + board.occupied_around(pos) as i32;
            if occupied == CLOISTER_VALUE {
                CLOISTER_VALUE
            } else {
                -occupied
            }
        }
        FeatureType::Farm => 0,
        FeatureType::Road | FeatureType::City => {
            let Some(s) = trace(board, pos, feature) else {
                return 0;
            };
            let base = (s.tiles.len() + s.shields) as i32;
            match (s.kind, s.is_closed()) {
                (FeatureType::City, true) => 2 * base,
                (FeatureType::City, false) => -base,
                (_, true) => s.tiles.len() as i32,
                (_, false) => -(s.tiles.len() as i32),
            }
        }
    }
}
