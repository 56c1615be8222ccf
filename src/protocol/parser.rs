//! Session command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the main loop can dispatch on.

use tracing::warn;

use super::notation::{parse_marker, parse_placement};
use crate::board::{Placement, Pos};

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a new game with the current options.
    NewGame,

    /// Place the drawn tile: `tile <placement>`.
    Tile(Placement),

    /// Place a marker: `marker <feature>[@<x>,<y>]`.
    Marker { feature: usize, at: Option<Pos> },

    /// End the turn without placing anything else.
    Pass,

    /// List legal placements of the drawn tile.
    Legal,

    /// Report turn, drawn tile, and scores.
    Status,

    /// Dump every placed tile.
    Board,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "pass" => Some(Command::Pass),
        "legal" => Some(Command::Legal),
        "status" => Some(Command::Status),
        "board" => Some(Command::Board),

        "setoption" => parse_setoption(&tokens),
        "tile" => parse_tile(&tokens),
        "marker" => parse_marker_command(&tokens),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `tile <placement>`.
fn parse_tile(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed tile: expected 'tile <kind><rotation>@<x>,<y>'");
        return None;
    }
    match parse_placement(tokens[1]) {
        Ok(p) => Some(Command::Tile(p)),
        Err(e) => {
            warn!(input = tokens[1], error = %e, "malformed tile");
            None
        }
    }
}

/// Parses `marker <feature>[@<x>,<y>]`.
fn parse_marker_command(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed marker: expected 'marker <feature>[@<x>,<y>]'");
        return None;
    }
    match parse_marker(tokens[1]) {
        Ok((feature, at)) => Some(Command::Marker { feature, at }),
        Err(e) => {
            warn!(input = tokens[1], error = %e, "malformed marker");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileKind;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("newgame"), Some(Command::NewGame));
        assert_eq!(parse_command("pass"), Some(Command::Pass));
        assert_eq!(parse_command("legal"), Some(Command::Legal));
        assert_eq!(parse_command("status"), Some(Command::Status));
        assert_eq!(parse_command("board"), Some(Command::Board));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        assert_eq!(
            parse_command("setoption name Players value 4"),
            Some(Command::SetOption {
                name: "Players".to_string(),
                value: Some("4".to_string()),
            })
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        assert_eq!(
            parse_command("setoption name Seed"),
            Some(Command::SetOption { name: "Seed".to_string(), value: None })
        );
    }

    #[test]
    fn parse_setoption_malformed_returns_none() {
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
    }

    #[test]
    fn parse_tile_command() {
        assert_eq!(
            parse_command("tile U1@1,0"),
            Some(Command::Tile(Placement::new(TileKind::U, 1, 0, 1)))
        );
        assert_eq!(parse_command("tile"), None);
        assert_eq!(parse_command("tile Q9@0,0"), None);
    }

    #[test]
    fn parse_marker_command_forms() {
        assert_eq!(parse_command("marker 1"), Some(Command::Marker { feature: 1, at: None }));
        assert_eq!(
            parse_command("marker 0@2,-3"),
            Some(Command::Marker { feature: 0, at: Some((2, -3)) })
        );
        assert_eq!(parse_command("marker"), None);
        assert_eq!(parse_command("marker road"), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
        assert_eq!(parse_command("  pass"), Some(Command::Pass));
    }
}
