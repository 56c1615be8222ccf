//! Line protocol handling.
//!
//! This module implements the text notation for placements, markers and
//! events, and the command parser for the main loop.

pub mod notation;
pub mod parser;

pub use notation::{
    format_event, format_marker, format_placement, format_scores, format_tile, parse_cell,
    parse_marker, parse_placement, NotationError,
};
pub use parser::{parse_command, Command};
