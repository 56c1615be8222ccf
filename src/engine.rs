//! Engine state management.
//!
//! Holds the game in progress and the engine options, applies moves read
//! from the session, and writes every broadcast update as a protocol line.

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::debug;

use crate::board::{MarkerSpot, Placement};
use crate::game::{EventLog, Game, GameConfig, Move, RoundRobin};
use crate::protocol::notation::{format_event, format_placement, format_scores, format_tile};

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub game: Option<Game<RoundRobin, EventLog>>,
    pub options: HashMap<String, String>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with no game and default options.
    pub fn new() -> Self {
        Engine {
            game: None,
            options: HashMap::new(),
        }
    }

    /// Sets an engine option. Takes effect at the next `newgame`.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    fn option<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.options.get(name).and_then(|v| v.parse::<T>().ok())
    }

    /// Game settings from the `Players`, `Markers` and `Seed` options.
    /// The seat count is clamped to `1..=MAX_PLAYERS`.
    pub fn config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            players: self.option("Players").unwrap_or(defaults.players),
            markers_per_player: self.option("Markers").unwrap_or(defaults.markers_per_player),
            seed: self.option("Seed").unwrap_or(defaults.seed),
        }
        .normalized()
    }

    /// Starts a new game and reports the opening state.
    pub fn new_game<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let config = self.config();
        debug!(?config, "starting game");
        self.game = Some(Game::with_log(config));
        self.report(out)
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `tile <placement>`.
    pub fn handle_tile<W: Write>(&mut self, placement: Placement, out: &mut W) -> io::Result<()> {
        self.play(Move::PlaceTile(placement), out)
    }

    /// Handles `marker <feature>[@<x>,<y>]`. Without a cell the marker goes
    /// on the tile placed this turn.
    pub fn handle_marker<W: Write>(
        &mut self,
        feature: usize,
        at: Option<(i32, i32)>,
        out: &mut W,
    ) -> io::Result<()> {
        let cell = at.or_else(|| self.game.as_ref().and_then(|g| g.placed_this_turn()));
        match cell {
            Some((x, y)) => self.play(Move::PlaceMarker(MarkerSpot::new(x, y, feature)), out),
            None => {
                writeln!(out, "error no tile placed this turn")?;
                out.flush()
            }
        }
    }

    /// Handles `pass`.
    pub fn handle_pass<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.play(Move::PlaceNothing, out)
    }

    /// Handles `legal`: every legal placement of the drawn tile on one line.
    pub fn handle_legal<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(game) = &self.game else {
            return no_game(out);
        };
        let legal: Vec<String> = game.legal_placements().iter().map(format_placement).collect();
        writeln!(out, "legal {}", legal.join(" "))?;
        out.flush()
    }

    /// Handles `status`.
    pub fn handle_status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(game) = &self.game else {
            return no_game(out);
        };
        if game.is_over() {
            writeln!(out, "status gameover scores {}", format_scores(game.scores()))?;
        } else {
            let tile = game.current_tile().map(|k| k.abbr()).unwrap_or('-');
            let markers: Vec<String> = (0..game.config().players)
                .map(|p| game.markers_available(p).to_string())
                .collect();
            writeln!(
                out,
                "status player {} tile {} phase {:?} remaining {} markers {} scores {}",
                game.current_player(),
                tile,
                game.phase(),
                game.tiles_remaining(),
                markers.join(" "),
                format_scores(game.scores())
            )?;
        }
        out.flush()
    }

    /// Handles `board`: one line per placed tile, in placement order.
    pub fn handle_board<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(game) = &self.game else {
            return no_game(out);
        };
        for tile in game.board().tiles() {
            writeln!(out, "board {}", format_tile(tile))?;
        }
        writeln!(out, "boardend")?;
        out.flush()
    }

    fn play<W: Write>(&mut self, mv: Move, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game.as_mut() else {
            return no_game(out);
        };
        if let Err(e) = game.apply(mv) {
            writeln!(out, "error {}", e)?;
        }
        self.report(out)
    }

    /// Writes pending events followed by whose turn it is.
    fn report<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(game) = self.game.as_mut() else {
            return no_game(out);
        };
        for event in game.replica_mut().drain() {
            writeln!(out, "{}", format_event(&event))?;
        }
        if game.is_over() {
            writeln!(out, "gameover {}", format_scores(game.scores()))?;
        } else {
            let tile = game.current_tile().map(|k| k.abbr()).unwrap_or('-');
            writeln!(out, "turn {} {} {:?}", game.current_player(), tile, game.phase())?;
        }
        out.flush()
    }
}

fn no_game<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "error no game in progress")?;
    out.flush()
}
