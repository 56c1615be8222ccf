//! Tilewright -- a tile-laying game rules engine with a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use tilewright::engine::Engine;
use tilewright::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => engine.new_game(&mut out)?,
            Command::Tile(placement) => engine.handle_tile(placement, &mut out)?,
            Command::Marker { feature, at } => engine.handle_marker(feature, at, &mut out)?,
            Command::Pass => engine.handle_pass(&mut out)?,
            Command::Legal => engine.handle_legal(&mut out)?,
            Command::Status => engine.handle_status(&mut out)?,
            Command::Board => engine.handle_board(&mut out)?,
            Command::Quit => break,
        }
    }

    out.flush()
}
