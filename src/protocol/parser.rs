//! Driver command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the main loop can dispatch on.

use crate::board::{Building, NodeId, Team};

/// A parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; the driver must reply `readyok`.
    IsReady,

    /// Override one configuration value: `setoption name <id> value <x>`.
    SetOption { name: String, value: String },

    /// Replace the configuration with one read from a JSON file.
    LoadConfig { path: String },

    /// Start a fresh game: `newgame <team,team,...> [seed]`.
    NewGame { teams: Vec<Team>, seed: Option<u64> },

    /// Advance the current game: `tick [count]`.
    Tick { count: u32 },

    Build {
        team: Team,
        node: NodeId,
        building: Building,
    },

    Send {
        team: Team,
        from: NodeId,
        to: NodeId,
        troops: u32,
    },

    Assign { team: Team, from: NodeId, to: NodeId },

    Unassign { team: Team, from: NodeId },

    Forfeit { team: Team },

    /// Print the current game as one JSON snapshot line.
    State,

    /// Replace the current game with a JSON snapshot given inline.
    Load { json: String },

    /// Terminate the driver.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "state" => Some(Command::State),

        "setoption" => parse_setoption(&tokens),
        "loadconfig" => parse_loadconfig(&tokens),
        "newgame" => parse_newgame(&tokens),
        "tick" => parse_tick(&tokens),
        "build" => parse_build(&tokens),
        "send" => parse_send(&tokens),
        "assign" => parse_assign(&tokens),
        "unassign" => parse_unassign(&tokens),
        "forfeit" => parse_forfeit(&tokens),
        "load" => parse_load(trimmed),

        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

/// Checks the token count, logging the expected usage on mismatch.
fn expect_args(tokens: &[&str], count: usize, usage: &str) -> Option<()> {
    if tokens.len() == count + 1 {
        Some(())
    } else {
        tracing::warn!(usage, "malformed {}", tokens[0]);
        None
    }
}

fn team(token: &str) -> Option<Team> {
    let team = Team::from_name(token);
    if team.is_none() {
        tracing::warn!(token, "unknown team");
    }
    team
}

fn node(token: &str) -> Option<NodeId> {
    match token.parse::<u32>() {
        Ok(id) => Some(NodeId(id)),
        Err(_) => {
            tracing::warn!(token, "invalid node id");
            None
        }
    }
}

/// Parses `setoption name <id> value <x>`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    let value_idx = tokens.iter().position(|&t| t == "value");
    match (tokens.get(1), value_idx) {
        (Some(&"name"), Some(vi)) if vi > 2 && vi + 1 < tokens.len() => Some(Command::SetOption {
            name: tokens[2..vi].join(" "),
            value: tokens[vi + 1..].join(" "),
        }),
        _ => {
            tracing::warn!("malformed setoption: expected 'setoption name <id> value <x>'");
            None
        }
    }
}

fn parse_loadconfig(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 1, "loadconfig <path>")?;
    Some(Command::LoadConfig {
        path: tokens[1].to_string(),
    })
}

/// Parses `newgame <team,team,...> [seed]`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 && tokens.len() != 3 {
        tracing::warn!("malformed newgame: expected 'newgame <team,team,...> [seed]'");
        return None;
    }

    let mut teams = Vec::new();
    for name in tokens[1].split(',') {
        let t = team(name)?;
        if teams.contains(&t) {
            tracing::warn!(team = %t, "team listed twice");
            return None;
        }
        teams.push(t);
    }

    let seed = match tokens.get(2) {
        Some(s) => match s.parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(seed = *s, "invalid seed");
                return None;
            }
        },
        None => None,
    };

    Some(Command::NewGame { teams, seed })
}

/// Parses `tick [count]`; the count defaults to one.
fn parse_tick(tokens: &[&str]) -> Option<Command> {
    match tokens.get(1) {
        None => Some(Command::Tick { count: 1 }),
        Some(s) => match s.parse::<u32>() {
            Ok(count) if tokens.len() == 2 => Some(Command::Tick { count }),
            _ => {
                tracing::warn!("malformed tick: expected 'tick [count]'");
                None
            }
        },
    }
}

fn parse_build(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 3, "build <team> <node> <building>")?;
    let building = match Building::from_name(tokens[3]) {
        Some(b) => b,
        None => {
            tracing::warn!(token = tokens[3], "unknown building");
            return None;
        }
    };
    Some(Command::Build {
        team: team(tokens[1])?,
        node: node(tokens[2])?,
        building,
    })
}

fn parse_send(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 4, "send <team> <from> <to> <troops>")?;
    let troops = match tokens[4].parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(token = tokens[4], "invalid troop count");
            return None;
        }
    };
    Some(Command::Send {
        team: team(tokens[1])?,
        from: node(tokens[2])?,
        to: node(tokens[3])?,
        troops,
    })
}

fn parse_assign(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 3, "assign <team> <from> <to>")?;
    Some(Command::Assign {
        team: team(tokens[1])?,
        from: node(tokens[2])?,
        to: node(tokens[3])?,
    })
}

fn parse_unassign(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 2, "unassign <team> <from>")?;
    Some(Command::Unassign {
        team: team(tokens[1])?,
        from: node(tokens[2])?,
    })
}

fn parse_forfeit(tokens: &[&str]) -> Option<Command> {
    expect_args(tokens, 1, "forfeit <team>")?;
    Some(Command::Forfeit {
        team: team(tokens[1])?,
    })
}

/// Parses `load <json>`, keeping everything after the keyword verbatim.
fn parse_load(line: &str) -> Option<Command> {
    let json = line.strip_prefix("load").unwrap_or("").trim();
    if json.is_empty() {
        tracing::warn!("malformed load: expected 'load <snapshot json>'");
        return None;
    }
    Some(Command::Load {
        json: json.to_string(),
    })
}
