//! Integration tests for the tilewright engine binary.
//!
//! Tests the full protocol session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_tilewright");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start tilewright");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

const SEED: &str = "setoption name Seed value 1234";

/// Runs a seeded game up to `legal` and returns the first legal placement.
fn first_legal_placement() -> String {
    let lines = run_engine(&[SEED, "newgame", "legal", "quit"]);
    let legal = lines
        .iter()
        .find_map(|l| l.strip_prefix("legal "))
        .expect("no legal line");
    legal.split_whitespace().next().expect("no legal placement").to_string()
}

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert!(lines.contains(&"readyok".to_string()));
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["frobnicate", "tile", "marker road", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn commands_before_newgame_report_errors() {
    let lines = run_engine(&["status", "pass", "quit"]);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l == "error no game in progress"));
}

#[test]
fn newgame_places_start_tile() {
    let lines = run_engine(&[SEED, "newgame", "quit"]);
    assert_eq!(lines[0], "tile D0@0,0");
    assert!(lines[1].starts_with("turn 0 "), "unexpected turn line: {}", lines[1]);
    assert!(lines[1].ends_with("PlaceTile"));
}

#[test]
fn seeded_games_are_reproducible() {
    let a = run_engine(&[SEED, "newgame", "legal", "status", "quit"]);
    let b = run_engine(&[SEED, "newgame", "legal", "status", "quit"]);
    assert_eq!(a, b);
}

#[test]
fn legal_tile_then_marker_session() {
    let placement = first_legal_placement();
    let tile_cmd = format!("tile {}", placement);
    let lines = run_engine(&[SEED, "newgame", &tile_cmd, "marker 0", "board", "quit"]);

    let echoed = format!("tile {}", placement);
    assert_eq!(lines.iter().filter(|l| **l == echoed).count(), 1);
    assert!(lines.iter().any(|l| l.starts_with("turn 0 - PlaceMarker")));

    // Either the marker was placed, or the feature was already claimed.
    let marker_line = lines
        .iter()
        .find(|l| l.starts_with("marker added 0 ") || l.starts_with("error illegal claim"));
    assert!(marker_line.is_some(), "no marker outcome in {:?}", lines);

    // Either way player 1 is up next.
    assert!(lines.iter().any(|l| l.starts_with("turn 1 ")));

    let board_lines: Vec<&String> = lines.iter().filter(|l| l.starts_with("board ")).collect();
    assert_eq!(board_lines.len(), 2);
    assert_eq!(lines.last().map(String::as_str), Some("boardend"));
}

#[test]
fn rejected_tile_keeps_turn() {
    let lines = run_engine(&[SEED, "newgame", "tile D0@0,0", "status", "quit"]);
    assert!(lines.iter().any(|l| l.starts_with("error invalid placement")));
    let status = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(status.starts_with("status player 0 "), "turn moved on: {}", status);
}

#[test]
fn marker_before_tile_is_rejected() {
    let lines = run_engine(&[SEED, "newgame", "marker 0", "marker 0@0,0", "status", "quit"]);
    assert!(lines.contains(&"error no tile placed this turn".to_string()));
    assert!(lines.contains(&"error placing a marker before a tile is not allowed now".to_string()));
    // A rejected early marker does not cost the turn.
    let status = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(status.starts_with("status player 0 "), "turn moved on: {}", status);
}

#[test]
fn passing_through_the_box_ends_the_game() {
    let mut commands = vec![SEED, "newgame"];
    commands.extend(std::iter::repeat("pass").take(80));
    commands.push("status");
    commands.push("quit");
    let lines = run_engine(&commands);

    let first_over = lines.iter().position(|l| l.starts_with("gameover ")).expect("game never ended");
    assert_eq!(lines[first_over], "gameover 0 0");
    assert!(lines.contains(&"error the game is over".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("status gameover scores 0 0"));
}

#[test]
fn players_option_sets_seat_count() {
    let lines = run_engine(&[
        "setoption name Players value 3",
        SEED,
        "newgame",
        "pass",
        "pass",
        "pass",
        "status",
        "quit",
    ]);
    let status = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(status.starts_with("status player 0 "), "three passes should wrap around: {}", status);
    assert!(status.ends_with("scores 0 0 0"));
}

#[test]
fn placement_at_coordinate_limit_is_rejected() {
    let lines = run_engine(&[SEED, "newgame", "tile U0@2147483647,0", "tile U0@-2147483648,0", "isready", "quit"]);
    let errors = lines.iter().filter(|l| l.starts_with("error invalid placement")).count();
    assert_eq!(errors, 2, "{:?}", lines);
    assert_eq!(lines.last().map(String::as_str), Some("readyok"));
}

#[test]
fn oversized_player_count_is_clamped() {
    let lines = run_engine(&["setoption name Players value 100000000000", SEED, "newgame", "status", "quit"]);
    let status = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(status.ends_with("scores 0 0 0 0 0 0 0 0"), "{}", status);
}
