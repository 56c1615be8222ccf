//! Self-play game generation CLI.
//!
//! Plays random games and outputs one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N         Number of games to play (default: 10)
//!   --players N       Players per game (default: 2)
//!   --markers N       Markers per player (default: 7)
//!   --marker-chance P Probability of placing a marker (default: 0.5)
//!   --threads N       Number of parallel threads (default: 4)
//!   --seed N          Random seed, 0 for entropy (default: 0)
//!   --output FILE     Output file path (default: stdout)
//!   --quiet           Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use tilewright::selfplay::{self, SelfPlayConfig};

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => config.num_games = value(&args, &mut i, flag),
            "--players" => config.players = value(&args, &mut i, flag),
            "--markers" => config.markers_per_player = value(&args, &mut i, flag),
            "--marker-chance" => config.marker_chance = value(&args, &mut i, flag),
            "--threads" => config.threads = value(&args, &mut i, flag),
            "--seed" => config.seed = value(&args, &mut i, flag),
            "--output" => output_path = Some(value(&args, &mut i, flag)),
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} players, {} markers each, marker chance {:.2}, {} threads",
            config.num_games,
            config.players,
            config.markers_per_player,
            config.marker_chance,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/s)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64().max(1e-9)
        );
        selfplay::print_summary(&games);
    }

    match output_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path);
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

/// Reads the value following a flag, exiting with usage on a bad value.
fn value<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    *i += 1;
    match args.get(*i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N          Number of games to play (default: 10)");
    eprintln!("  --players N        Players per game (default: 2)");
    eprintln!("  --markers N        Markers per player (default: 7)");
    eprintln!("  --marker-chance P  Probability of placing a marker (default: 0.5)");
    eprintln!("  --threads N        Number of parallel threads (default: 4)");
    eprintln!("  --seed N           Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE      Output file path (default: stdout)");
    eprintln!("  --quiet            Suppress summary output");
    eprintln!("  --help             Show this help");
}
