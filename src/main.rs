//! Nodewar -- a line-oriented driver for the territory-control simulation.
//!
//! This binary reads commands from stdin and writes one reply per command to
//! stdout. Logging goes to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead};

use nodewar::engine::Engine;
use nodewar::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
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
            Command::SetOption { name, value } => engine.set_option(&name, &value, &mut out)?,
            Command::LoadConfig { path } => engine.load_config(&path, &mut out)?,
            Command::NewGame { teams, seed } => engine.new_game(&teams, seed, &mut out)?,
            Command::Tick { count } => engine.handle_tick(count, &mut out)?,
            Command::Build {
                team,
                node,
                building,
            } => engine.with_game(&mut out, |g| g.build(team, node, building))?,
            Command::Send {
                team,
                from,
                to,
                troops,
            } => engine.with_game(&mut out, |g| g.send_army(team, from, to, troops))?,
            Command::Assign { team, from, to } => {
                engine.with_game(&mut out, |g| g.assign(team, from, to))?
            }
            Command::Unassign { team, from } => {
                engine.with_game(&mut out, |g| g.unassign(team, from))?
            }
            Command::Forfeit { team } => engine.with_game(&mut out, |g| g.forfeit(team))?,
            Command::State => engine.handle_state(&mut out)?,
            Command::Load { json } => engine.handle_load(&json, &mut out)?,
            Command::Quit => break,
        }
    }

    Ok(())
}
