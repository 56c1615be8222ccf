//! Tilewright engine library.
//!
//! Exposes the board model, placement and scoring rules, game flow,
//! protocol, and self-play modules for use by integration tests and the
//! binary entry points.

pub mod board;
pub mod engine;
pub mod game;
pub mod protocol;
pub mod rules;
pub mod selfplay;
