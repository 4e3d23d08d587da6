//! Self-play game generation CLI.
//!
//! Plays games between random bots and outputs game records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --teams N       Teams per game, 1-6 (default: 4)
//!   --max-ticks N   Tick cap per game (default: 4000)
//!   --interval N    Ticks between bot decisions (default: 4)
//!   --nodes N       Map node count (default: 48)
//!   --config FILE   JSON game configuration
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use nodewar::config::GameConfig;
use nodewar::selfplay::{self, SelfPlayConfig};

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut node_count: Option<usize> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => config.num_games = value(&args, &mut i),
            "--teams" => config.teams = value(&args, &mut i),
            "--max-ticks" => config.max_ticks = value(&args, &mut i),
            "--interval" => config.decision_interval = value(&args, &mut i),
            "--nodes" => node_count = Some(value(&args, &mut i)),
            "--config" => {
                let path: String = value(&args, &mut i);
                config.game = match GameConfig::load(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("failed to load {}: {}", path, e);
                        process::exit(1);
                    }
                };
            }
            "--threads" => config.threads = value(&args, &mut i),
            "--seed" => config.seed = value(&args, &mut i),
            "--output" => output_path = Some(value(&args, &mut i)),
            "--quiet" => {
                quiet = true;
            }
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

    if let Some(n) = node_count {
        config.game.map.node_count = n;
    }
    if let Err(e) = config.game.validate() {
        eprintln!("{}", e);
        process::exit(1);
    }
    config.quiet = quiet;

    if !quiet {
        eprintln!(
            "Self-play: {} games, {} teams, {} nodes, max {} ticks, {} threads",
            config.num_games,
            config.teams,
            config.game.map.node_count,
            config.max_ticks,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/hour)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64().max(1e-9) * 3600.0
        );
        selfplay::print_summary(&games);
    }

    match output_path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !quiet {
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

/// Consumes the value following the flag at `args[*i]`, exiting on error.
fn value<T: FromStr>(args: &[String], i: &mut usize) -> T {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid or missing value for {}", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --teams N        Teams per game, 1-6 (default: 4)");
    eprintln!("  --max-ticks N    Tick cap per game (default: 4000)");
    eprintln!("  --interval N     Ticks between bot decisions (default: 4)");
    eprintln!("  --nodes N        Map node count (default: 48)");
    eprintln!("  --config FILE    JSON game configuration");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
