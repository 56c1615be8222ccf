//! Text notation for placements, markers, and broadcast events.
//!
//! A placement is written `<kind><rotation>@<x>,<y>`, e.g. `U1@0,-1` for a
//! straight road turned once clockwise, one cell north of the origin. A
//! marker is written `<feature>@<x>,<y>`, or just `<feature>` when the cell
//! is implied by the tile placed this turn.

use thiserror::Error;

use crate::board::{Marker, Placement, Pos, Tile, TileKind};
use crate::game::Event;

/// Errors that can occur when parsing notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown tile kind '{0}'")]
    UnknownTile(char),

    #[error("invalid rotation '{0}', expected 0-3")]
    BadRotation(String),

    #[error("missing '{sep}' in '{input}'")]
    MissingSeparator { sep: char, input: String },

    #[error("invalid coordinate '{0}'")]
    BadCoordinate(String),

    #[error("invalid feature index '{0}'")]
    BadFeature(String),
}

/// Parses `<kind><rotation>@<x>,<y>`.
pub fn parse_placement(s: &str) -> Result<Placement, NotationError> {
    let s = s.trim();
    let mut chars = s.chars();
    let Some(letter) = chars.next() else {
        return Err(NotationError::EmptyInput);
    };
    let kind = TileKind::from_abbr(letter.to_ascii_uppercase())
        .ok_or(NotationError::UnknownTile(letter))?;

    let rest = chars.as_str();
    let (rotation, cell) = rest.split_once('@').ok_or_else(|| NotationError::MissingSeparator {
        sep: '@',
        input: s.to_string(),
    })?;
    let rotation = match rotation.parse::<u8>() {
        Ok(r) if r < 4 => r,
        _ => return Err(NotationError::BadRotation(rotation.to_string())),
    };
    let (x, y) = parse_cell(cell)?;
    Ok(Placement::new(kind, x, y, rotation))
}

/// Formats a placement in `<kind><rotation>@<x>,<y>` form.
pub fn format_placement(p: &Placement) -> String {
    format!("{}{}@{},{}", p.kind.abbr(), p.rotation, p.x, p.y)
}

/// Parses `<x>,<y>`.
pub fn parse_cell(s: &str) -> Result<Pos, NotationError> {
    let (x, y) = s.split_once(',').ok_or_else(|| NotationError::MissingSeparator {
        sep: ',',
        input: s.to_string(),
    })?;
    let coord = |t: &str| {
        t.trim()
            .parse::<i32>()
            .map_err(|_| NotationError::BadCoordinate(t.to_string()))
    };
    Ok((coord(x)?, coord(y)?))
}

/// Parses `<feature>` or `<feature>@<x>,<y>`.
pub fn parse_marker(s: &str) -> Result<(usize, Option<Pos>), NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    let (feature, cell) = match s.split_once('@') {
        Some((f, c)) => (f, Some(parse_cell(c)?)),
        None => (s, None),
    };
    let feature = feature
        .parse::<usize>()
        .map_err(|_| NotationError::BadFeature(feature.to_string()))?;
    Ok((feature, cell))
}

/// Formats a marker as `<owner> <feature>@<x>,<y> <group>`.
pub fn format_marker(m: &Marker) -> String {
    format!("{} {}@{},{} {}", m.owner, m.feature, m.x, m.y, m.claim_group)
}

/// One board line: placement, per-feature claims, and the marker if any.
pub fn format_tile(t: &Tile) -> String {
    let claims: Vec<String> = t.claims.iter().map(|c| c.to_string()).collect();
    let marker = match &t.marker {
        Some(m) => format!("{}:{}", m.owner, m.feature),
        None => "-".to_string(),
    };
    format!("{} claims {} marker {}", format_placement(&t.placement()), claims.join(","), marker)
}

/// Formats a space-separated score list.
pub fn format_scores(scores: &[i32]) -> String {
    let parts: Vec<String> = scores.iter().map(|s| s.to_string()).collect();
    parts.join(" ")
}

/// Formats a broadcast event as one protocol line.
pub fn format_event(event: &Event) -> String {
    match event {
        Event::TileAdded { placement } => format!("tile {}", format_placement(placement)),
        Event::MarkerAdded { marker } => format!("marker added {}", format_marker(marker)),
        Event::MarkerRemoved { marker } => format!("marker removed {}", format_marker(marker)),
        Event::ScoresChanged { scores } => format!("scores {}", format_scores(scores)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_placement_basic() {
        assert_eq!(parse_placement("U1@0,-1"), Ok(Placement::new(TileKind::U, 0, -1, 1)));
        assert_eq!(parse_placement(" d0@3,4 "), Ok(Placement::new(TileKind::D, 3, 4, 0)));
    }

    #[test]
    fn format_placement_matches_parse() {
        let p = Placement::new(TileKind::X, -2, 5, 3);
        assert_eq!(format_placement(&p), "X3@-2,5");
        assert_eq!(parse_placement(&format_placement(&p)), Ok(p));
    }

    #[test]
    fn parse_placement_errors() {
        assert_eq!(parse_placement(""), Err(NotationError::EmptyInput));
        assert_eq!(parse_placement("Z0@0,0"), Err(NotationError::UnknownTile('Z')));
        assert_eq!(parse_placement("U4@0,0"), Err(NotationError::BadRotation("4".to_string())));
        assert!(matches!(parse_placement("U1"), Err(NotationError::MissingSeparator { sep: '@', .. })));
        assert!(matches!(parse_placement("U1@0"), Err(NotationError::MissingSeparator { sep: ',', .. })));
        assert_eq!(parse_placement("U1@a,0"), Err(NotationError::BadCoordinate("a".to_string())));
    }

    #[test]
    fn parse_marker_forms() {
        assert_eq!(parse_marker("2"), Ok((2, None)));
        assert_eq!(parse_marker("0@1,-1"), Ok((0, Some((1, -1)))));
        assert_eq!(parse_marker("x"), Err(NotationError::BadFeature("x".to_string())));
        assert_eq!(parse_marker(""), Err(NotationError::EmptyInput));
    }

    #[test]
    fn format_events() {
        let marker = Marker { owner: 1, x: 0, y: 0, feature: 2, claim_group: 3 };
        assert_eq!(
            format_event(&Event::TileAdded { placement: Placement::new(TileKind::D, 0, 0, 0) }),
            "tile D0@0,0"
        );
        assert_eq!(format_event(&Event::MarkerAdded { marker }), "marker added 1 2@0,0 3");
        assert_eq!(format_event(&Event::MarkerRemoved { marker }), "marker removed 1 2@0,0 3");
        assert_eq!(format_event(&Event::ScoresChanged { scores: vec![4, 0] }), "scores 4 0");
    }

    #[test]
    fn format_start_tile_line() {
        let t = Tile::new(Placement::new(TileKind::D, 0, 0, 0));
        assert_eq!(format_tile(&t), "D0@0,0 claims 0,0,0,0 marker -");
    }
}
