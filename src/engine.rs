//! Driver state management.
//!
//! Holds the active configuration and the current game between commands,
//! and writes one reply line per command: `ok`, `fail <reason>`, or a JSON
//! snapshot for `state`.

use std::io::{self, Write};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::Team;
use crate::config::GameConfig;
use crate::game::{CommandError, Game};
use crate::protocol::snapshot::GameSnapshot;

/// Holds the mutable state of the driver between commands.
pub struct Engine {
    pub config: GameConfig,
    pub game: Option<Game>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates a driver with the default configuration and no game.
    pub fn new() -> Self {
        Engine::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Engine { config, game: None }
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Overrides one configuration value. Takes effect on the next game.
    pub fn set_option<W: Write>(&mut self, name: &str, value: &str, out: &mut W) -> io::Result<()> {
        let result = self.config.set_option(name, value);
        reply(out, result)
    }

    /// Replaces the configuration with the contents of a JSON file.
    pub fn load_config<W: Write>(&mut self, path: &str, out: &mut W) -> io::Result<()> {
        let result = GameConfig::load(path).map(|config| self.config = config);
        reply(out, result)
    }

    /// Starts a new game, dropping any game in progress.
    pub fn new_game<W: Write>(
        &mut self,
        teams: &[Team],
        seed: Option<u64>,
        out: &mut W,
    ) -> io::Result<()> {
        self.game = Some(Game::seeded(self.config.clone(), teams, seed));
        reply::<_, CommandError>(out, Ok(()))
    }

    /// Runs `count` ticks of the current game.
    pub fn handle_tick<W: Write>(&mut self, count: u32, out: &mut W) -> io::Result<()> {
        self.with_game(out, |game| {
            for _ in 0..count {
                game.tick();
            }
            Ok(())
        })
    }

    /// Applies one game command and reports the outcome.
    pub fn with_game<W, F>(&mut self, out: &mut W, f: F) -> io::Result<()>
    where
        W: Write,
        F: FnOnce(&mut Game) -> Result<(), CommandError>,
    {
        match self.game.as_mut() {
            Some(game) => reply(out, f(game)),
            None => {
                tracing::warn!("command issued with no game in progress");
                writeln!(out, "fail no game in progress")?;
                out.flush()
            }
        }
    }

    /// Writes the current game as one JSON line.
    pub fn handle_state<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.game {
            Some(game) => {
                let json = GameSnapshot::capture(game)
                    .to_json()
                    .map_err(io::Error::other)?;
                writeln!(out, "{}", json)?;
            }
            None => writeln!(out, "fail no game in progress")?,
        }
        out.flush()
    }

    /// Replaces the current game with one restored from a JSON snapshot.
    pub fn handle_load<W: Write>(&mut self, json: &str, out: &mut W) -> io::Result<()> {
        let result = GameSnapshot::from_json(json).and_then(|snap| {
            let game = snap.restore(self.config.clone(), SmallRng::from_entropy())?;
            self.game = Some(game);
            Ok(())
        });
        reply(out, result)
    }
}

/// Writes `ok` or `fail <reason>`.
fn reply<W: Write, E: std::fmt::Display>(out: &mut W, result: Result<(), E>) -> io::Result<()> {
    match result {
        Ok(()) => writeln!(out, "ok")?,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            writeln!(out, "fail {}", e)?;
        }
    }
    out.flush()
}
