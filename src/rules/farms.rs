//! End-of-game farm scoring.
//!
//! Every claimed city is paired with the claimed farms touching it. For each
//! city, the players with the most markers on those farms earn a flat bonus.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::claims::claim_structure;
use super::structure::feature_value;
use crate::board::{Board, ClaimGroup, FeatureType, Pos, UNCLAIMED};

/// Upper bound on distinct farm groups recorded per city.
pub const MAX_ABUTTING_FARMS: usize = 35;

/// Points per city for each player holding the farm majority.
pub const FARM_CITY_BONUS: i32 = 4;

/// Farm result for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmAward {
    pub city: ClaimGroup,
    pub farms: Vec<ClaimGroup>,
    /// Markers per player on the abutting farms.
    pub counts: Vec<usize>,
    pub winners: Vec<usize>,
}

impl FarmAward {
    pub fn credit(&self, scores: &mut [i32]) {
        for &p in &self.winners {
            if let Some(s) = scores.get_mut(p) {
                *s += FARM_CITY_BONUS;
            }
        }
    }
}

/// Gives every completed but unclaimed city a fresh claim group so it can
/// count for farms. Claimed cities keep their groups whether or not they
/// were completed. Returns the groups created.
pub fn prepare_cities(board: &mut Board) -> Vec<ClaimGroup> {
    let positions: Vec<Pos> = board.tiles().iter().map(|t| t.pos()).collect();
    let mut created = Vec::new();
    for pos in positions {
        let Some(count) = board.tile(pos).map(|t| t.feature_count()) else {
            continue;
        };
        for feature in 0..count {
            let is_city = board
                .tile(pos)
                .is_some_and(|t| t.feature_type(feature) == FeatureType::City);
            if !is_city || board.claim(pos, feature) != Some(UNCLAIMED) {
                continue;
            }
            if feature_value(board, pos, feature) > 0 {
                if let Some(group) = claim_structure(board, pos, feature) {
                    debug!(group, x = pos.0, y = pos.1, "claimed completed city for farms");
                    created.push(group);
                }
            }
        }
    }
    created
}

/// Maps every claimed city group to the distinct claimed farm groups
/// touching it anywhere on the board.
pub fn city_farm_abutments(board: &Board) -> BTreeMap<ClaimGroup, BTreeSet<ClaimGroup>> {
    abutments_up_to(board, MAX_ABUTTING_FARMS)
}

fn abutments_up_to(board: &Board, cap: usize) -> BTreeMap<ClaimGroup, BTreeSet<ClaimGroup>> {
    let mut cities: BTreeMap<ClaimGroup, BTreeSet<ClaimGroup>> = BTreeMap::new();
    for tile in board.tiles() {
        for city in 0..tile.feature_count() {
            let city_claim = tile.claims[city];
            if tile.feature_type(city) != FeatureType::City || city_claim == UNCLAIMED {
                continue;
            }
            let farms = cities.entry(city_claim).or_default();
            for &farm in tile.kind.city_farms(city) {
                let Some(&farm_claim) = tile.claims.get(farm) else {
                    continue;
                };
                if farm_claim == UNCLAIMED || farms.contains(&farm_claim) {
                    continue;
                }
                if farms.len() >= cap {
                    warn!(city = city_claim, farm = farm_claim, "too many farms abut city, ignoring");
                    continue;
                }
                debug!(city = city_claim, farm = farm_claim, x = tile.x, y = tile.y, "city abuts farm");
                farms.insert(farm_claim);
            }
        }
    }
    cities
}

/// Runs the farm pass: prepares cities, then awards each city's bonus.
///
/// Counts the live markers on the board. Farm markers are never removed.
pub fn score_farms(board: &mut Board, players: usize) -> Vec<FarmAward> {
    prepare_cities(board);

    let mut awards = Vec::new();
    for (city, farms) in city_farm_abutments(board) {
        if farms.is_empty() {
            continue;
        }
        let mut counts = vec![0usize; players];
        for m in board.markers().filter(|m| farms.contains(&m.claim_group)) {
            if let Some(c) = counts.get_mut(m.owner) {
                *c += 1;
            }
        }
        let max = counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            continue;
        }
        let winners: Vec<usize> = (0..players).filter(|&p| counts[p] == max).collect();
        info!(city, counts = ?counts, winners = ?winners, "scored farms around city");
        awards.push(FarmAward {
            city,
            farms: farms.into_iter().collect(),
            counts,
            winners,
        });
    }
    awards
}
