//! Game flow: tile box, turns, moves, and score publication.
//!
//! A [`Game`] owns one board and applies moves for the current player.
//! Every state change a client could observe is reported to a [`Replica`],
//! and turn order is delegated to a [`TurnManager`].

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{
    standard_tile_set, Board, Marker, MarkerSpot, Placement, Pos, Tile, TileKind,
    MARKERS_PER_PLAYER,
};
use crate::rules::{
    apply_placement, check_placement, has_legal_placement, legal_placements, markers_in_play,
    place, score_farms, score_features, Award, ClaimError, FarmAward, MarkerSnapshot, MarkerView,
    PlacementError, ScoreDelta,
};

/// Most players a game seats.
pub const MAX_PLAYERS: usize = 8;

/// Game settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: usize,
    pub markers_per_player: usize,
    /// Seed for the tile shuffle (0 = use entropy).
    pub seed: u64,
}

impl GameConfig {
    /// Returns the settings with the seat count clamped to `1..=MAX_PLAYERS`.
    pub fn normalized(self) -> Self {
        GameConfig { players: self.players.clamp(1, MAX_PLAYERS), ..self }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            players: 2,
            markers_per_player: MARKERS_PER_PLAYER,
            seed: 0,
        }
    }
}

/// Decides whose turn it is.
pub trait TurnManager {
    fn current_player(&self) -> usize;
    fn end_turn(&mut self);
    fn end_game(&mut self);
}

/// Players take turns in seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    players: usize,
    current: usize,
    over: bool,
}

impl RoundRobin {
    pub fn new(players: usize) -> Self {
        RoundRobin { players: players.max(1), current: 0, over: false }
    }

    pub fn is_over(&self) -> bool {
        self.over
    }
}

impl TurnManager for RoundRobin {
    fn current_player(&self) -> usize {
        self.current
    }

    fn end_turn(&mut self) {
        if !self.over {
            self.current = (self.current + 1) % self.players;
        }
    }

    fn end_game(&mut self) {
        self.over = true;
    }
}

/// Receives every change clients need to mirror the game.
pub trait Replica {
    fn tile_added(&mut self, tile: &Tile);
    fn marker_added(&mut self, marker: &Marker);
    fn marker_removed(&mut self, marker: &Marker);
    fn scores_changed(&mut self, scores: &[i32]);
}

/// Discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReplica;

impl Replica for NullReplica {
    fn tile_added(&mut self, _tile: &Tile) {}
    fn marker_added(&mut self, _marker: &Marker) {}
    fn marker_removed(&mut self, _marker: &Marker) {}
    fn scores_changed(&mut self, _scores: &[i32]) {}
}

/// One broadcast update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    TileAdded { placement: Placement },
    MarkerAdded { marker: Marker },
    MarkerRemoved { marker: Marker },
    ScoresChanged { scores: Vec<i32> },
}

/// Records updates in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Takes every recorded event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl Replica for EventLog {
    fn tile_added(&mut self, tile: &Tile) {
        self.events.push(Event::TileAdded { placement: tile.placement() });
    }

    fn marker_added(&mut self, marker: &Marker) {
        self.events.push(Event::MarkerAdded { marker: *marker });
    }

    fn marker_removed(&mut self, marker: &Marker) {
        self.events.push(Event::MarkerRemoved { marker: *marker });
    }

    fn scores_changed(&mut self, scores: &[i32]) {
        self.events.push(Event::ScoresChanged { scores: scores.to_vec() });
    }
}

/// A player's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    PlaceTile(Placement),
    PlaceMarker(MarkerSpot),
    PlaceNothing,
}

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("invalid placement: {0}")]
    Placement(#[from] PlacementError),

    #[error("illegal claim: {0}")]
    Claim(#[from] ClaimError),

    #[error("the game is over")]
    GameOver,

    #[error("{0} is not allowed now")]
    OutOfPhase(&'static str),
}

/// What the current player must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    PlaceTile,
    PlaceMarker,
    GameOver,
}

/// Results of the end-of-game pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalTally {
    /// Incomplete (and any leftover complete) structures scored at the end.
    pub awards: Vec<Award>,
    pub farms: Vec<FarmAward>,
}

/// One game in progress.
pub struct Game<T: TurnManager, R: Replica> {
    config: GameConfig,
    board: Board,
    scores: Vec<i32>,
    tiles_in_box: VecDeque<TileKind>,
    current_tile: Option<TileKind>,
    placed_this_turn: Option<Pos>,
    phase: TurnPhase,
    discarded: Vec<TileKind>,
    final_tally: Option<FinalTally>,
    turns: T,
    replica: R,
}

impl Game<RoundRobin, EventLog> {
    /// A seat-order game recording its updates.
    pub fn with_log(config: GameConfig) -> Self {
        let config = config.normalized();
        Game::new(config, RoundRobin::new(config.players), EventLog::new())
    }
}

impl<T: TurnManager, R: Replica> Game<T, R> {
    /// Shuffles the box, places the starting tile and draws the first tile.
    pub fn new(config: GameConfig, turns: T, replica: R) -> Self {
        let mut rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed)
        } else {
            SmallRng::from_entropy()
        };
        let mut tiles = standard_tile_set();
        tiles.shuffle(&mut rng);
        Game::with_tiles(config, tiles, turns, replica)
    }

    /// Starts a game drawing from `tiles` front to back.
    pub fn with_tiles(config: GameConfig, tiles: Vec<TileKind>, turns: T, mut replica: R) -> Self {
        let config = config.normalized();
        let board = Board::with_starting_tile();
        for tile in board.tiles() {
            replica.tile_added(tile);
        }
        let mut game = Game {
            config,
            board,
            scores: vec![0; config.players],
            tiles_in_box: tiles.into(),
            current_tile: None,
            placed_this_turn: None,
            phase: TurnPhase::PlaceTile,
            discarded: Vec::new(),
            final_tally: None,
            turns,
            replica,
        };
        info!(players = config.players, tiles = game.tiles_in_box.len(), "new game");
        game.draw();
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::GameOver
    }

    pub fn current_player(&self) -> usize {
        self.turns.current_player()
    }

    /// The tile the current player must place, if any.
    pub fn current_tile(&self) -> Option<TileKind> {
        self.current_tile
    }

    /// Cell of the tile placed this turn, once placed.
    pub fn placed_this_turn(&self) -> Option<Pos> {
        self.placed_this_turn
    }

    pub fn tiles_remaining(&self) -> usize {
        self.tiles_in_box.len()
    }

    /// Tiles drawn with no legal placement and set aside.
    pub fn discarded(&self) -> &[TileKind] {
        &self.discarded
    }

    pub fn final_tally(&self) -> Option<&FinalTally> {
        self.final_tally.as_ref()
    }

    pub fn replica(&self) -> &R {
        &self.replica
    }

    pub fn replica_mut(&mut self) -> &mut R {
        &mut self.replica
    }

    /// Markers the player may still place.
    pub fn markers_available(&self, player: usize) -> usize {
        self.config
            .markers_per_player
            .saturating_sub(markers_in_play(&self.board, player))
    }

    /// Legal placements of the current tile.
    pub fn legal_placements(&self) -> Vec<Placement> {
        match (self.phase, self.current_tile) {
            (TurnPhase::PlaceTile, Some(kind)) => legal_placements(&self.board, kind),
            _ => Vec::new(),
        }
    }

    /// Applies a move for the current player.
    ///
    /// A rejected tile leaves the turn open. Marker moves and passes end the
    /// turn whether or not they succeed.
    pub fn apply(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.phase == TurnPhase::GameOver {
            return Err(MoveError::GameOver);
        }
        match mv {
            Move::PlaceTile(placement) => self.place_tile(placement),
            Move::PlaceMarker(spot) => self.place_marker(spot),
            Move::PlaceNothing => {
                debug!(player = self.current_player(), "pass");
                self.end_turn();
                Ok(())
            }
        }
    }

    fn place_tile(&mut self, placement: Placement) -> Result<(), MoveError> {
        if self.phase != TurnPhase::PlaceTile {
            return Err(MoveError::OutOfPhase("placing a second tile"));
        }
        let Some(expected) = self.current_tile else {
            return Err(MoveError::OutOfPhase("placing a tile with none drawn"));
        };
        if placement.kind != expected {
            let e = PlacementError::WrongTile { expected: expected.abbr(), got: placement.kind.abbr() };
            return Err(e.into());
        }

        let tile = Tile::new(placement);
        if let Err(e) = check_placement(&self.board, &tile) {
            warn!(player = self.current_player(), ?placement, error = %e, "rejected tile");
            return Err(e.into());
        }
        let pos = tile.pos();
        if !self.board.insert(tile) {
            return Err(PlacementError::Occupied(pos.0, pos.1).into());
        }
        let merges = apply_placement(&mut self.board, pos);
        if let Some(placed) = self.board.tile(pos) {
            self.replica.tile_added(placed);
        }
        info!(player = self.current_player(), ?placement, merges = merges.len(), "placed tile");

        self.current_tile = None;
        self.placed_this_turn = Some(pos);
        self.phase = TurnPhase::PlaceMarker;
        self.score_live(pos);

        let player = self.current_player();
        if markers_in_play(&self.board, player) >= self.config.markers_per_player {
            self.end_turn();
        }
        Ok(())
    }

    fn place_marker(&mut self, spot: MarkerSpot) -> Result<(), MoveError> {
        if self.phase != TurnPhase::PlaceMarker {
            return Err(MoveError::OutOfPhase("placing a marker before a tile"));
        }
        let player = self.current_player();
        let result = if self.placed_this_turn != Some(spot.pos()) {
            Err(ClaimError::NotCurrentTile(spot.x, spot.y))
        } else {
            place(&mut self.board, spot.marker_for(player), self.config.markers_per_player)
        };

        match result {
            Ok(marker) => {
                self.replica.marker_added(&marker);
                // A marker on an already complete feature scores at once.
                self.score_live(marker.pos());
                self.end_turn();
                Ok(())
            }
            Err(e) => {
                warn!(player, ?spot, error = %e, "rejected marker");
                self.end_turn();
                Err(e.into())
            }
        }
    }

    fn score_live(&mut self, pos: Pos) {
        let delta = score_features(&mut self.board, pos, &mut MarkerView::Live, self.config.players);
        self.publish(&delta);
    }

    fn publish(&mut self, delta: &ScoreDelta) {
        for award in &delta.awards {
            award.credit(&mut self.scores);
            self.replica.scores_changed(&self.scores);
            for marker in &award.released {
                self.replica.marker_removed(marker);
            }
        }
    }

    fn end_turn(&mut self) {
        self.turns.end_turn();
        self.placed_this_turn = None;
        self.current_tile = None;
        self.draw();
    }

    /// Draws the next playable tile, discarding unplayable ones. An empty
    /// box ends the game.
    fn draw(&mut self) {
        while let Some(kind) = self.tiles_in_box.pop_front() {
            if has_legal_placement(&self.board, kind) {
                debug!(player = self.current_player(), tile = %kind.abbr(), "drew tile");
                self.current_tile = Some(kind);
                self.phase = TurnPhase::PlaceTile;
                return;
            }
            info!(tile = %kind.abbr(), "discarding unplayable tile");
            self.discarded.push(kind);
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.turns.end_game();
        self.phase = TurnPhase::GameOver;
        self.current_tile = None;

        let players = self.config.players;
        let mut snapshot = MarkerSnapshot::of(&self.board);
        let positions: Vec<Pos> = self.board.tiles().iter().map(|t| t.pos()).collect();
        let mut tally = FinalTally::default();
        {
            let mut view = MarkerView::Snapshot(&mut snapshot);
            for pos in positions {
                let delta = score_features(&mut self.board, pos, &mut view, players);
                delta.credit(&mut self.scores);
                tally.awards.extend(delta.awards);
            }
        }
        tally.farms = score_farms(&mut self.board, players);
        for farm in &tally.farms {
            farm.credit(&mut self.scores);
        }

        info!(scores = ?self.scores, "game over");
        self.replica.scores_changed(&self.scores);
        self.final_tally = Some(tally);
    }
}
