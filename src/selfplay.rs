//! Self-play game generation.
//!
//! Plays full games between random bots, ticking the simulation and letting
//! every surviving team issue commands each decision interval. Records per-
//! interval team summaries and the outcome, and writes them as JSONL.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{Team, ALL_TEAMS};
use crate::config::GameConfig;
use crate::game::Game;
use crate::movegen::random_commands;

/// Configuration for self-play game generation.
#[derive(Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Number of teams per game (1-6).
    pub teams: usize,
    /// Tick cap; games still running at this point end without a winner.
    pub max_ticks: u64,
    /// Ticks between bot decisions.
    pub decision_interval: u64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
    /// Game rules and map parameters.
    pub game: GameConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            teams: 4,
            max_ticks: 4000,
            decision_interval: 4,
            threads: 4,
            seed: 0,
            quiet: false,
            game: GameConfig::default(),
        }
    }
}

/// Per-team standing at one point in a game.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub team: Team,
    pub nodes: usize,
    pub troops: u64,
}

/// Snapshot of all teams at one decision point.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub armies: usize,
    pub teams: Vec<TeamSummary>,
    /// Commands accepted at this decision point.
    pub accepted: usize,
    /// Commands refused at this decision point.
    pub refused: usize,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    /// Node count of the generated map.
    pub map_nodes: usize,
    /// The last team standing, if any.
    pub winner: Option<Team>,
    /// Tick on which the game ended.
    pub final_tick: u64,
    /// Teams in the order they were eliminated.
    pub eliminated: Vec<Team>,
    pub history: Vec<TickRecord>,
}

fn summarize(game: &Game, teams: &[Team]) -> Vec<TeamSummary> {
    teams
        .iter()
        .map(|&team| TeamSummary {
            team,
            nodes: game.nodes_owned(team),
            troops: game.troops_of(team),
        })
        .collect()
}

/// Plays a single game to a winner or to the tick cap.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> GameRecord {
    let teams: Vec<Team> = ALL_TEAMS
        .iter()
        .copied()
        .take(config.teams.clamp(1, ALL_TEAMS.len()))
        .collect();
    let sim_rng = SmallRng::from_rng(&mut *rng).unwrap_or_else(|_| SmallRng::from_entropy());
    let mut game = Game::new(config.game.clone(), &teams, sim_rng);
    let interval = config.decision_interval.max(1);

    let mut alive = teams.clone();
    let mut eliminated = Vec::new();
    let mut history = Vec::new();

    while game.current_tick() < config.max_ticks {
        game.tick();

        // Teams without a node forfeit their remaining armies.
        for &team in &alive {
            if game.nodes_owned(team) == 0 {
                if let Err(e) = game.forfeit(team) {
                    tracing::debug!(game_id, %team, error = %e, "forfeit refused");
                }
            }
        }
        let still: Vec<Team> = game.alive_teams();
        for &team in &alive {
            if !still.contains(&team) {
                tracing::debug!(game_id, %team, tick = game.current_tick(), "team eliminated");
                eliminated.push(team);
            }
        }
        alive = still;

        if alive.len() <= 1 {
            break;
        }

        if game.current_tick() % interval == 0 {
            let mut accepted = 0;
            let mut refused = 0;
            for &team in &alive {
                for cmd in random_commands(&game, team, rng) {
                    match cmd.apply(&mut game, team) {
                        Ok(()) => accepted += 1,
                        Err(_) => refused += 1,
                    }
                }
            }
            history.push(TickRecord {
                tick: game.current_tick(),
                armies: game.armies().len(),
                teams: summarize(&game, &teams),
                accepted,
                refused,
            });
        }
    }

    GameRecord {
        game_id,
        map_nodes: game.map().len(),
        winner: game.winner(),
        final_tick: game.current_tick(),
        eliminated,
        history,
    }
}

/// Runs self-play generation, returning all game records.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |g| games.push(g));
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play generation, calling `on_game` with each completed game record.
///
/// This allows the caller to process games incrementally (e.g. write to disk)
/// rather than waiting for all games to finish.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

fn log_game(game: &GameRecord, n: usize, total: usize, started: Instant) {
    let outcome = match game.winner {
        Some(w) => format!("{} wins", w),
        None => "draw".to_string(),
    };
    tracing::info!(
        "Game {}/{}: {} at tick {} ({:.1}s)",
        n,
        total,
        outcome,
        game.final_tick,
        started.elapsed().as_secs_f64(),
    );
}

/// The seed every game of a run derives from; zero draws one from entropy.
fn base_seed(config: &SelfPlayConfig) -> u64 {
    if config.seed != 0 {
        config.seed
    } else {
        SmallRng::from_entropy().gen()
    }
}

/// Random source for game `i`, independent of how games are scheduled.
fn game_rng(base: u64, i: usize) -> SmallRng {
    SmallRng::seed_from_u64(base.wrapping_add(i as u64))
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    let base = base_seed(config);
    for i in 0..config.num_games {
        let game_start = Instant::now();
        let game = play_game(config, i, &mut game_rng(base, i));
        if !config.quiet {
            log_game(&game, i + 1, config.num_games, game_start);
        }
        on_game(game);
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "thread pool unavailable, running sequentially");
            return run_self_play_sequential(config, on_game);
        }
    };

    let base = base_seed(config);
    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let mut rng = game_rng(base, i);
                    let game_start = Instant::now();
                    let game = play_game(&config_clone, i, &mut rng);
                    if !config_clone.quiet {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(&game, n, config_clone.num_games, game_start);
                    }
                    let _ = tx.send(game);
                });
        });
    });

    // Receive completed games on the main thread and pass to callback.
    for game in rx {
        on_game(game);
    }

    if handle.join().is_err() {
        tracing::error!("selfplay worker thread panicked");
    }
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let mut win_counts = [0usize; ALL_TEAMS.len()];
    let mut draw_count = 0usize;
    let mut total_ticks = 0u64;

    for game in games {
        total_ticks += game.final_tick;
        match game.winner {
            Some(w) => win_counts[w as usize] += 1,
            None => draw_count += 1,
        }
    }

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!(
        "Avg ticks/game: {:.1}",
        total_ticks as f64 / total.max(1) as f64
    );
    eprintln!("Draws (tick cap): {}", draw_count);
    eprintln!("Win distribution:");
    for team in ALL_TEAMS {
        let wins = win_counts[team as usize];
        let pct = 100.0 * wins as f64 / total.max(1) as f64;
        eprintln!("  {:>8}: {} ({:.1}%)", team.name(), wins, pct);
    }
}
