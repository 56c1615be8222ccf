//! Self-play game generation.
//!
//! Plays full games with random legal moves: a uniformly chosen legal
//! placement each turn, and a marker on a random unclaimed feature of the
//! new tile with a configurable probability. Records every turn and the
//! final result for regression checks and rule statistics.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::warn;

use crate::board::{MarkerSpot, TileKind, UNCLAIMED};
use crate::game::{Game, GameConfig, Move, NullReplica, RoundRobin, TurnPhase};
use crate::protocol::notation::format_placement;

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Players per game.
    pub players: usize,
    /// Markers each player owns.
    pub markers_per_player: usize,
    /// Probability of placing a marker when one is available.
    pub marker_chance: f64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        SelfPlayConfig {
            num_games: 10,
            players: game.players,
            markers_per_player: game.markers_per_player,
            marker_chance: 0.5,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// A single recorded turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub player: usize,
    pub tile: TileKind,
    /// Placement in protocol notation.
    pub placement: String,
    pub marker: Option<MarkerSpot>,
    /// Scores after the turn.
    pub scores: Vec<i32>,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    /// Seed of the tile shuffle.
    pub seed: u64,
    pub turns: Vec<TurnRecord>,
    /// Tiles drawn with nowhere to go.
    pub discarded: Vec<TileKind>,
    pub final_scores: Vec<i32>,
    /// Players sharing the top score.
    pub winners: Vec<usize>,
    /// Turns in which any score rose.
    pub scoring_turns: usize,
    /// Structures and farm cities scored at the final tally.
    pub awards_final: usize,
}

/// Plays one game to completion.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    // Seed 0 means entropy to the game, so keep the drawn seed non-zero.
    let seed = rng.gen::<u64>() | 1;
    let game_config = GameConfig {
        players: config.players,
        markers_per_player: config.markers_per_player,
        seed,
    }
    .normalized();
    let mut game = Game::new(game_config, RoundRobin::new(game_config.players), NullReplica);
    let mut turns = Vec::new();
    let mut scoring_turns = 0;

    while !game.is_over() {
        let player = game.current_player();
        let Some(tile) = game.current_tile() else {
            break;
        };
        let Some(&placement) = game.legal_placements().choose(rng) else {
            warn!(game_id, tile = %tile.abbr(), "drawn tile has no legal placement");
            let _ = game.apply(Move::PlaceNothing);
            continue;
        };
        let before: i32 = game.scores().iter().sum();
        if let Err(e) = game.apply(Move::PlaceTile(placement)) {
            warn!(game_id, error = %e, "legal placement rejected");
            let _ = game.apply(Move::PlaceNothing);
            continue;
        }

        let mut marker = None;
        if game.phase() == TurnPhase::PlaceMarker {
            marker = choose_marker(&game, config.marker_chance, rng);
            let mv = marker.map_or(Move::PlaceNothing, Move::PlaceMarker);
            if let Err(e) = game.apply(mv) {
                warn!(game_id, error = %e, "random marker rejected");
            }
        }
        if game.scores().iter().sum::<i32>() > before && !game.is_over() {
            scoring_turns += 1;
        }

        turns.push(TurnRecord {
            player,
            tile,
            placement: format_placement(&placement),
            marker,
            scores: game.scores().to_vec(),
        });
    }

    let final_scores = game.scores().to_vec();
    let best = final_scores.iter().copied().max().unwrap_or(0);
    let winners = (0..final_scores.len()).filter(|&p| final_scores[p] == best).collect();
    let awards_final = game
        .final_tally()
        .map(|t| t.awards.len() + t.farms.len())
        .unwrap_or(0);

    GameRecord {
        game_id,
        seed,
        turns,
        discarded: game.discarded().to_vec(),
        final_scores,
        winners,
        scoring_turns,
        awards_final,
    }
}

/// Picks a random unclaimed feature of the tile placed this turn, or
/// `None` to pass.
fn choose_marker(
    game: &Game<RoundRobin, NullReplica>,
    marker_chance: f64,
    rng: &mut SmallRng,
) -> Option<MarkerSpot> {
    let (x, y) = game.placed_this_turn()?;
    let available = game.markers_available(game.current_player());
    if available == 0 || !rng.gen_bool(marker_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let tile = game.board().tile((x, y))?;
    if tile.marker.is_some() {
        return None;
    }
    let open: Vec<usize> = (0..tile.feature_count())
        .filter(|&f| tile.claims[f] == UNCLAIMED)
        .collect();
    open.choose(rng).map(|&f| MarkerSpot::new(x, y, f))
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    });
    games
}

/// Runs self-play generation, calling `on_game` with each completed game record.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

fn game_rng(seed: u64, offset: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(offset as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn report_progress(config: &SelfPlayConfig, n: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    eprintln!(
        "Game {}/{}: scores {:?}, {} turns ({:.2}s)",
        n,
        config.num_games,
        game.final_scores,
        game.turns.len(),
        started.elapsed().as_secs_f64(),
    );
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    let mut rng = game_rng(config.seed, 0);
    for i in 0..config.num_games {
        let started = Instant::now();
        let game = play_game(config, i, &mut rng);
        report_progress(config, i + 1, &game, started);
        on_game(game);
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Completed games reach the callback on the calling thread through a channel.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!(error = %e, "failed to build thread pool, playing sequentially");
            run_self_play_sequential(config, on_game);
            return;
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|s| {
        s.spawn(|| {
            pool.install(|| {
                (0..config.num_games).into_par_iter().for_each_with(tx, |tx, i| {
                    let mut rng = game_rng(config.seed, i);
                    let started = Instant::now();
                    let game = play_game(config, i, &mut rng);
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    report_progress(config, n, &game, started);
                    let _ = tx.send(game);
                });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len().max(1) as f64;
    let players = games.iter().map(|g| g.final_scores.len()).max().unwrap_or(0);
    let mut wins = vec![0usize; players];
    let mut score_sum = vec![0i64; players];
    let mut turn_sum = 0usize;
    let mut discard_sum = 0usize;

    for game in games {
        turn_sum += game.turns.len();
        discard_sum += game.discarded.len();
        for &w in &game.winners {
            wins[w] += 1;
        }
        for (p, &s) in game.final_scores.iter().enumerate() {
            score_sum[p] += s as i64;
        }
    }

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", games.len());
    eprintln!("Avg turns/game: {:.1}", turn_sum as f64 / total);
    eprintln!("Avg discarded tiles/game: {:.2}", discard_sum as f64 / total);
    eprintln!("Per seat (wins include ties):");
    for p in 0..players {
        eprintln!(
            "  seat {}: {} wins ({:.1}%), avg score {:.1}",
            p,
            wins[p],
            100.0 * wins[p] as f64 / total,
            score_sum[p] as f64 / total
        );
    }
}
