//! Claim-group union engine.
//!
//! Claim groups name claimed structures. A group is created when a marker
//! lands on an unclaimed feature and is spread over the whole connected
//! structure. When a new tile joins features of claimed structures, the
//! smallest touching group survives and everything connected is relabelled
//! to it, so every claimed structure carries exactly one group.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::structure::trace;
use crate::board::{adjacent_features, Board, ClaimGroup, Pos, UNCLAIMED};

/// One merge performed while a tile was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub absorbed: ClaimGroup,
    pub survivor: ClaimGroup,
}

/// Labels every feature of the structure containing `(pos, feature)` with
/// `group`. Returns the number of features touched.
pub fn relabel_structure(board: &mut Board, pos: Pos, feature: usize, group: ClaimGroup) -> usize {
    let Some(structure) = trace(board, pos, feature) else {
        return 0;
    };
    for &(at, f) in &structure.members {
        board.set_claim(at, f, group);
    }
    structure.members.len()
}

/// Creates a fresh claim group for the structure containing a feature.
///
/// Returns `None` if the tile or feature does not exist.
pub fn claim_structure(board: &mut Board, pos: Pos, feature: usize) -> Option<ClaimGroup> {
    let tile = board.tile(pos)?;
    if feature >= tile.feature_count() {
        return None;
    }
    let group = board.allocate_claim();
    let members = relabel_structure(board, pos, feature, group);
    debug!(group, members, x = pos.0, y = pos.1, feature, "claimed structure");
    Some(group)
}

/// Inherits and merges claim groups into the tile just inserted at `pos`.
///
/// Must run once per tile, right after the board accepted it. Features
/// that only touch unclaimed structures stay unclaimed.
pub fn apply_placement(board: &mut Board, pos: Pos) -> Vec<Merge> {
    let Some(tile) = board.tile(pos) else {
        warn!(x = pos.0, y = pos.1, "claim union requested for a missing tile");
        return Vec::new();
    };
    let feature_count = tile.feature_count();

    let mut merges = Vec::new();
    for feature in 0..feature_count {
        let own = board.claim(pos, feature).unwrap_or(UNCLAIMED);
        let mut groups: BTreeSet<ClaimGroup> = adjacent_features(board, pos, feature)
            .into_iter()
            .filter_map(|(at, f)| board.claim(at, f))
            .filter(|&g| g != UNCLAIMED)
            .collect();
        if own != UNCLAIMED {
            groups.insert(own);
        }

        let Some(&survivor) = groups.iter().next() else {
            continue;
        };
        if groups.len() == 1 && own == survivor {
            continue;
        }
        for &absorbed in groups.iter().skip(1) {
            debug!(absorbed, survivor, x = pos.0, y = pos.1, "merging claim groups");
            merges.push(Merge { absorbed, survivor });
        }
        relabel_structure(board, pos, feature, survivor);
    }
    merges
}
