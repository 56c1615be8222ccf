//! Randomised property checks over full games.
//!
//! Plays seeded random games through the game driver and, after every
//! move, cross-checks the incremental claim bookkeeping against a fresh
//! traversal of the board.

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use tilewright::board::{
    Board, ClaimGroup, MarkerSpot, Placement, Pos, Tile, ALL_TILE_KINDS, UNCLAIMED,
};
use tilewright::game::{Event, EventLog, Game, GameConfig, Move, RoundRobin, TurnPhase};
use tilewright::rules::{check_placement, trace, validate};

/// Every claimed structure carries exactly one group, and no group spans
/// two structures.
fn check_partition(board: &Board) {
    let mut structure_of_group: HashMap<ClaimGroup, BTreeSet<(Pos, usize)>> = HashMap::new();
    for tile in board.tiles() {
        for f in 0..tile.feature_count() {
            let group = tile.claims[f];
            let structure = trace(board, tile.pos(), f).unwrap();
            let members: BTreeSet<(Pos, usize)> = structure.members.iter().copied().collect();
            for &(at, g) in &members {
                assert_eq!(
                    board.claim(at, g),
                    Some(group),
                    "feature {:?}/{} and {:?}/{} are connected but labelled differently",
                    tile.pos(),
                    f,
                    at,
                    g
                );
            }
            if group == UNCLAIMED {
                continue;
            }
            assert!(group < board.peek_next_claim(), "group {} was never allocated", group);
            match structure_of_group.get(&group) {
                Some(existing) => assert_eq!(existing, &members, "group {} spans two structures", group),
                None => {
                    structure_of_group.insert(group, members);
                }
            }
        }
    }
}

/// Markers agree with the claims of the features they sit on.
fn check_markers(board: &Board) {
    for m in board.markers() {
        let tile = board.tile(m.pos()).unwrap();
        assert_eq!(tile.claims[m.feature], m.claim_group);
        assert_ne!(m.claim_group, UNCLAIMED);
    }
}

fn random_move(game: &Game<RoundRobin, EventLog>, rng: &mut SmallRng) -> Move {
    match game.phase() {
        TurnPhase::PlaceTile => match game.legal_placements().choose(rng) {
            Some(&p) => Move::PlaceTile(p),
            None => Move::PlaceNothing,
        },
        TurnPhase::PlaceMarker => {
            let Some((x, y)) = game.placed_this_turn() else {
                return Move::PlaceNothing;
            };
            if rng.gen_bool(0.4) {
                let count = game.board().tile((x, y)).map_or(0, |t| t.feature_count());
                Move::PlaceMarker(MarkerSpot::new(x, y, rng.gen_range(0..count.max(1))))
            } else {
                Move::PlaceNothing
            }
        }
        TurnPhase::GameOver => Move::PlaceNothing,
    }
}

#[test]
fn claim_partition_holds_throughout_random_games() {
    for seed in 1..=6u64 {
        let config = GameConfig { players: 2 + (seed as usize % 3), seed, ..GameConfig::default() };
        let mut game = Game::with_log(config);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut retired: HashSet<ClaimGroup> = HashSet::new();
        let mut live: HashSet<ClaimGroup> = HashSet::new();

        while !game.is_over() {
            let mv = random_move(&game, &mut rng);
            let _ = game.apply(mv);
            check_partition(game.board());
            check_markers(game.board());

            // A group that disappears from the board never comes back.
            let now: HashSet<ClaimGroup> = game
                .board()
                .tiles()
                .iter()
                .flat_map(|t| t.claims.iter().copied())
                .filter(|&g| g != UNCLAIMED)
                .collect();
            assert!(now.is_disjoint(&retired), "seed {}: a retired group reappeared", seed);
            retired.extend(live.difference(&now).copied());
            live = now;
        }
    }
}

#[test]
fn scores_never_decrease_during_play() {
    for seed in 10..14u64 {
        let mut game = Game::with_log(GameConfig { seed, ..GameConfig::default() });
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut last = game.scores().to_vec();
        while !game.is_over() {
            let mv = random_move(&game, &mut rng);
            let _ = game.apply(mv);
            for (p, (&now, &before)) in game.scores().iter().zip(&last).enumerate() {
                assert!(now >= before, "seed {}: player {} dropped from {} to {}", seed, p, before, now);
            }
            last = game.scores().to_vec();
        }
    }
}

#[test]
fn validation_is_idempotent_and_pure() {
    let mut game = Game::with_log(GameConfig { seed: 99, ..GameConfig::default() });
    let mut rng = SmallRng::seed_from_u64(99);
    for _ in 0..30 {
        if game.is_over() {
            break;
        }
        let mv = random_move(&game, &mut rng);
        let _ = game.apply(mv);
    }

    let board = game.board().clone();
    let frontier = board.frontier();
    for &(x, y) in frontier.iter().take(12) {
        for kind in ALL_TILE_KINDS {
            for rotation in 0..4 {
                let candidate = Tile::new(Placement::new(kind, x, y, rotation));
                let first = check_placement(&board, &candidate);
                let second = check_placement(&board, &candidate);
                assert_eq!(first, second);
                assert_eq!(first.is_ok(), validate(&board, &candidate));
            }
        }
    }
    assert_eq!(&board, game.board());

    // Occupied cells are never legal.
    for tile in board.tiles() {
        let candidate = Tile::new(Placement::new(tile.kind, tile.x, tile.y, tile.rotation));
        assert!(!validate(&board, &candidate));
    }
}

#[test]
fn final_tally_keeps_markers_and_broadcasts_once() {
    let mut game = Game::with_log(GameConfig { seed: 5, ..GameConfig::default() });
    let mut rng = SmallRng::seed_from_u64(5);
    let mut markers_before_end = 0;
    let mut scores_before_end = Vec::new();
    while !game.is_over() {
        markers_before_end = game.board().markers().count();
        scores_before_end = game.scores().to_vec();
        game.replica_mut().drain();
        let mv = random_move(&game, &mut rng);
        let _ = game.apply(mv);
    }

    // The last move may score live before the tally; the tally itself removes nothing.
    let events = game.replica_mut().drain();
    let removed = events
        .iter()
        .filter(|e| matches!(e, Event::MarkerRemoved { .. }))
        .count();
    let added = events
        .iter()
        .filter(|e| matches!(e, Event::MarkerAdded { .. }))
        .count();
    assert_eq!(game.board().markers().count(), markers_before_end + added - removed);
    assert!(matches!(events.last(), Some(Event::ScoresChanged { .. })));
    for (now, before) in game.scores().iter().zip(&scores_before_end) {
        assert!(now >= before);
    }
    assert!(game.final_tally().is_some());
}
