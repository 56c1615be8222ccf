//! Completion and incremental scoring.
//!
//! The same routine scores a tile during play and during the final tally.
//! During play it reads and releases the live markers on the board; during
//! the final tally it works on a [`MarkerSnapshot`] so the board keeps
//! showing every marker while each claim group is resolved exactly once.

use serde::Serialize;
use tracing::{info, warn};

use super::markers::release;
use super::structure::feature_value;
use crate::board::{shift, Board, ClaimGroup, FeatureType, Marker, Pos, UNCLAIMED};

/// An owned copy of the live markers, consumed by the final tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSnapshot {
    markers: Vec<Option<Marker>>,
}

impl MarkerSnapshot {
    /// Copies every marker currently on the board.
    pub fn of(board: &Board) -> Self {
        MarkerSnapshot {
            markers: board.markers().copied().map(Some).collect(),
        }
    }

    /// Markers not yet released from the snapshot.
    pub fn remaining(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining().next().is_none()
    }

    /// Clears every entry claiming `group` and returns them.
    pub fn release_group(&mut self, group: ClaimGroup) -> Vec<Marker> {
        let mut released = Vec::new();
        for slot in &mut self.markers {
            if slot.is_some_and(|m| m.claim_group == group) {
                released.extend(slot.take());
            }
        }
        released
    }

    /// Clears the entry for the marker sitting on `(pos, feature)`.
    pub fn release_at(&mut self, pos: Pos, feature: usize) -> Option<Marker> {
        self.markers
            .iter_mut()
            .find(|slot| slot.is_some_and(|m| m.pos() == pos && m.feature == feature))
            .and_then(Option::take)
    }

    fn at(&self, pos: Pos) -> Option<&Marker> {
        self.remaining().find(|m| m.pos() == pos)
    }
}

/// Where claimants are looked up and released.
#[derive(Debug)]
pub enum MarkerView<'a> {
    /// The markers on the board. Released markers leave their tiles.
    Live,
    /// A final-tally snapshot. Released markers leave only the snapshot.
    Snapshot(&'a mut MarkerSnapshot),
}

impl MarkerView<'_> {
    /// True during the final tally, when incomplete structures also score.
    pub fn is_final(&self) -> bool {
        matches!(self, MarkerView::Snapshot(_))
    }
}

/// Per-player marker counts on one claim group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimVector {
    counts: Vec<usize>,
}

impl ClaimVector {
    /// Counts the markers claiming `group`, ignoring owners outside `players`.
    pub fn tally<'m>(
        markers: impl IntoIterator<Item = &'m Marker>,
        group: ClaimGroup,
        players: usize,
    ) -> Self {
        let mut counts = vec![0; players];
        for m in markers {
            if m.claim_group != group {
                continue;
            }
            match counts.get_mut(m.owner) {
                Some(c) => *c += 1,
                None => warn!(owner = m.owner, players, "marker owner out of range"),
            }
        }
        ClaimVector { counts }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn max(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Players tied at the highest non-zero count. Empty if nobody claims.
    pub fn winners(&self) -> Vec<usize> {
        let max = self.max();
        if max == 0 {
            return Vec::new();
        }
        (0..self.counts.len()).filter(|&p| self.counts[p] == max).collect()
    }
}

/// One resolved structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Award {
    pub kind: FeatureType,
    pub group: ClaimGroup,
    /// Tile and feature the structure was scored from.
    pub x: i32,
    pub y: i32,
    pub feature: usize,
    /// Points each winner receives.
    pub points: i32,
    pub complete: bool,
    pub winners: Vec<usize>,
    /// Markers freed by this award.
    #[serde(skip)]
    pub released: Vec<Marker>,
}

impl Award {
    /// Adds this award's points to a score vector.
    pub fn credit(&self, scores: &mut [i32]) {
        for &p in &self.winners {
            if let Some(s) = scores.get_mut(p) {
                *s += self.points;
            }
        }
    }
}

/// Everything one scoring call resolved, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDelta {
    pub awards: Vec<Award>,
}

impl ScoreDelta {
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty()
    }

    /// Adds every award to a score vector.
    pub fn credit(&self, scores: &mut [i32]) {
        for award in &self.awards {
            award.credit(scores);
        }
    }

    /// Points gained per player.
    pub fn totals(&self, players: usize) -> Vec<i32> {
        let mut totals = vec![0; players];
        self.credit(&mut totals);
        totals
    }
}

/// Scores the roads and cities of the tile at `pos`, then any claimed
/// cloister in the 3x3 block around it.
///
/// During play only complete structures score. With a snapshot view every
/// claimed structure scores at its current value.
pub fn score_features(
    board: &mut Board,
    pos: Pos,
    view: &mut MarkerView<'_>,
    players: usize,
) -> ScoreDelta {
    let mut delta = ScoreDelta::default();
    let Some(tile) = board.tile(pos) else {
        warn!(x = pos.0, y = pos.1, "scoring requested for a missing tile");
        return delta;
    };
    let edge_features: Vec<(usize, FeatureType)> = (0..tile.feature_count())
        .map(|f| (f, tile.feature_type(f)))
        .filter(|(_, kind)| kind.is_edge_scored())
        .collect();

    for (feature, kind) in edge_features {
        let group = board.claim(pos, feature).unwrap_or(UNCLAIMED);
        if group == UNCLAIMED {
            continue;
        }
        let claim = match view {
            MarkerView::Live => ClaimVector::tally(board.markers(), group, players),
            MarkerView::Snapshot(snapshot) => ClaimVector::tally(snapshot.remaining(), group, players),
        };
        let winners = claim.winners();
        if winners.is_empty() {
            continue;
        }

        let value = feature_value(board, pos, feature);
        if value <= 0 && !view.is_final() {
            continue;
        }

        let released = release_group(board, view, group);
        let award = Award {
            kind,
            group,
            x: pos.0,
            y: pos.1,
            feature,
            points: value.abs(),
            complete: value > 0,
            winners,
            released,
        };
        info!(
            kind = ?award.kind,
            group,
            points = award.points,
            complete = award.complete,
            winners = ?award.winners,
            "scored structure"
        );
        delta.awards.push(award);
    }

    score_cloisters(board, pos, view, &mut delta);
    delta
}

fn release_group(board: &mut Board, view: &mut MarkerView<'_>, group: ClaimGroup) -> Vec<Marker> {
    match view {
        MarkerView::Snapshot(snapshot) => snapshot.release_group(group),
        MarkerView::Live => {
            let claimants: Vec<Marker> =
                board.markers().filter(|m| m.claim_group == group).copied().collect();
            claimants.iter().filter_map(|m| release(board, m)).collect()
        }
    }
}

fn score_cloisters(board: &mut Board, pos: Pos, view: &mut MarkerView<'_>, delta: &mut ScoreDelta) {
    for dx in -1..=1 {
        for dy in -1..=1 {
            let Some(at) = shift(pos, dx, dy) else {
                continue;
            };
            let Some(tile) = board.tile(at) else {
                continue;
            };
            let marker = match view {
                MarkerView::Live => tile.marker,
                MarkerView::Snapshot(snapshot) => snapshot.at(at).copied(),
            };
            let Some(marker) = marker else {
                continue;
            };
            let on_cloister = marker.feature < tile.feature_count()
                && tile.feature_type(marker.feature) == FeatureType::Cloister
                && tile.claims.get(marker.feature) == Some(&marker.claim_group);
            if !on_cloister {
                continue;
            }

            let value = feature_value(board, at, marker.feature);
            if value <= 0 && !view.is_final() {
                continue;
            }

            let released = match view {
                MarkerView::Live => release(board, &marker).into_iter().collect(),
                MarkerView::Snapshot(snapshot) => {
                    snapshot.release_at(at, marker.feature).into_iter().collect()
                }
            };
            info!(
                x = at.0,
                y = at.1,
                points = value.abs(),
                player = marker.owner,
                "scored cloister"
            );
            delta.awards.push(Award {
                kind: FeatureType::Cloister,
                group: marker.claim_group,
                x: at.0,
                y: at.1,
                feature: marker.feature,
                points: value.abs(),
                complete: value > 0,
                winners: vec![marker.owner],
                released,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MarkerSpot, Placement, Tile, TileKind};
    use crate::rules::{claims::apply_placement, markers::place};

    fn put(board: &mut Board, kind: TileKind, x: i32, y: i32, rotation: u8) {
        assert!(board.insert(Tile::new(Placement::new(kind, x, y, rotation))));
        apply_placement(board, (x, y));
    }

    fn marker(board: &mut Board, owner: usize, x: i32, y: i32, feature: usize) -> Marker {
        place(board, MarkerSpot::new(x, y, feature).marker_for(owner), 7).unwrap()
    }

    #[test]
    fn winners_share_ties_at_max() {
        let markers = [
            Marker { owner: 0, x: 0, y: 0, feature: 0, claim_group: 5 },
            Marker { owner: 1, x: 1, y: 0, feature: 0, claim_group: 5 },
            Marker { owner: 0, x: 2, y: 0, feature: 0, claim_group: 5 },
            Marker { owner: 1, x: 3, y: 0, feature: 0, claim_group: 5 },
            Marker { owner: 2, x: 4, y: 0, feature: 0, claim_group: 5 },
            Marker { owner: 2, x: 5, y: 0, feature: 0, claim_group: 6 },
        ];
        let claim = ClaimVector::tally(&markers, 5, 3);
        assert_eq!(claim.counts(), &[2, 2, 1]);
        assert_eq!(claim.winners(), vec![0, 1]);
        assert!(ClaimVector::tally(&markers, 9, 3).winners().is_empty());
    }

    #[test]
    fn open_structures_do_not_score_during_play() {
        let mut board = Board::with_starting_tile();
        marker(&mut board, 0, 0, 0, 1);
        let delta = score_features(&mut board, (0, 0), &mut MarkerView::Live, 2);
        assert!(delta.is_empty());
        assert_eq!(board.markers().count(), 1);
    }

    #[test]
    fn completed_city_scores_and_releases() {
        let mut board = Board::with_starting_tile();
        let m = marker(&mut board, 1, 0, 0, 0);
        put(&mut board, TileKind::E, 0, -1, 2);
        let delta = score_features(&mut board, (0, -1), &mut MarkerView::Live, 2);
        assert_eq!(delta.awards.len(), 1);
        let award = &delta.awards[0];
        assert_eq!((award.kind, award.points, award.complete), (FeatureType::City, 4, true));
        assert_eq!(award.winners, vec![1]);
        assert_eq!(award.released, vec![m]);
        assert_eq!(delta.totals(2), vec![0, 4]);
        assert_eq!(board.markers().count(), 0);

        // Rescoring finds nobody left to pay.
        assert!(score_features(&mut board, (0, -1), &mut MarkerView::Live, 2).is_empty());
    }

    #[test]
    fn snapshot_scores_open_structures_without_touching_board() {
        let mut board = Board::with_starting_tile();
        marker(&mut board, 0, 0, 0, 1);
        let mut snapshot = MarkerSnapshot::of(&board);
        let delta = score_features(&mut board, (0, 0), &mut MarkerView::Snapshot(&mut snapshot), 2);
        assert_eq!(delta.totals(2), vec![1, 0]);
        assert!(!delta.awards[0].complete);
        assert!(snapshot.is_empty());
        assert_eq!(board.markers().count(), 1);

        // The group is resolved once; scoring again pays nothing.
        let again = score_features(&mut board, (0, 0), &mut MarkerView::Snapshot(&mut snapshot), 2);
        assert!(again.is_empty());
    }

    #[test]
    fn completed_cloister_scores_nine() {
        let mut board = Board::new();
        board.insert(Tile::new(Placement::new(TileKind::B, 0, 0, 0)));
        let m = marker(&mut board, 0, 0, 0, 0);
        let ring = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];
        for (x, y) in ring {
            put(&mut board, TileKind::B, x, y, 0);
            assert!(score_features(&mut board, (x, y), &mut MarkerView::Live, 2).is_empty());
        }
        put(&mut board, TileKind::B, 1, 1, 0);
        let delta = score_features(&mut board, (1, 1), &mut MarkerView::Live, 2);
        assert_eq!(delta.awards.len(), 1);
        assert_eq!(delta.awards[0].points, 9);
        assert_eq!(delta.awards[0].released, vec![m]);
        assert_eq!(board.markers().count(), 0);
    }

    #[test]
    fn incomplete_cloister_scores_at_final_tally() {
        let mut board = Board::new();
        board.insert(Tile::new(Placement::new(TileKind::B, 0, 0, 0)));
        marker(&mut board, 1, 0, 0, 0);
        put(&mut board, TileKind::B, 1, 0, 0);
        let mut snapshot = MarkerSnapshot::of(&board);
        let mut view = MarkerView::Snapshot(&mut snapshot);
        let first = score_features(&mut board, (0, 0), &mut view, 2);
        let second = score_features(&mut board, (1, 0), &mut view, 2);
        assert_eq!(first.totals(2), vec![0, 2]);
        assert!(second.is_empty());
    }
}
