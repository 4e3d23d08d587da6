//! Random command generation.
//!
//! Produces plausible commands for a team in the current game state. Used by
//! the self-play harness as a baseline bot and by the property tests to
//! drive games through many states.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Building, NodeId, Team};
use crate::game::{CommandError, Game};

/// Minimum garrison before a random bot considers attacking.
const ATTACK_THRESHOLD: u32 = 8;

/// One command a bot wants to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Send { from: NodeId, to: NodeId, troops: u32 },
    Build { node: NodeId, building: Building },
    Assign { from: NodeId, to: NodeId },
    Unassign { from: NodeId },
}

impl BotCommand {
    /// Issues this command on behalf of `team`.
    pub fn apply<R: Rng>(self, game: &mut Game<R>, team: Team) -> Result<(), CommandError> {
        match self {
            BotCommand::Send { from, to, troops } => game.send_army(team, from, to, troops),
            BotCommand::Build { node, building } => game.build(team, node, building),
            BotCommand::Assign { from, to } => game.assign(team, from, to),
            BotCommand::Unassign { from } => game.unassign(team, from),
        }
    }
}

/// Picks a random set of commands for `team`, at most one per owned node.
///
/// Nodes rich enough for a building sometimes buy one; nodes with a healthy
/// garrison sometimes attack a neighbor they do not own, or reinforce one
/// they do. Standing orders are set and cleared rarely.
pub fn random_commands<R: Rng>(game: &Game<R>, team: Team, rng: &mut impl Rng) -> Vec<BotCommand> {
    let map = game.map();
    let rules = &game.config().rules;
    let mut commands = Vec::new();

    for node in map.nodes().iter().filter(|n| n.is_owned_by(team)) {
        let affordable: Vec<Building> = [
            Building::Factory,
            Building::PowerPlant,
            Building::Fort,
            Building::Artillery,
        ]
        .into_iter()
        .filter(|&b| b != node.building)
        .filter(|&b| rules.building_cost(b).is_some_and(|c| c <= node.troops))
        .collect();

        if !affordable.is_empty() && rng.gen_bool(0.1) {
            if let Some(&building) = affordable.choose(rng) {
                commands.push(BotCommand::Build {
                    node: node.id,
                    building,
                });
                continue;
            }
        }

        if node.standing_order.is_some() && rng.gen_bool(0.02) {
            commands.push(BotCommand::Unassign { from: node.id });
            continue;
        }

        let (friendly, hostile): (Vec<NodeId>, Vec<NodeId>) = node
            .adjacent
            .iter()
            .copied()
            .partition(|&id| map.node(id).is_some_and(|n| n.is_owned_by(team)));

        if node.standing_order.is_none() && !friendly.is_empty() && rng.gen_bool(0.02) {
            if let Some(&to) = friendly.choose(rng) {
                commands.push(BotCommand::Assign { from: node.id, to });
                continue;
            }
        }

        if node.troops >= ATTACK_THRESHOLD && rng.gen_bool(0.25) {
            let target = if hostile.is_empty() {
                friendly.choose(rng)
            } else {
                hostile.choose(rng)
            };
            if let Some(&to) = target {
                let troops = rng.gen_range(node.troops / 2..=node.troops);
                commands.push(BotCommand::Send {
                    from: node.id,
                    to,
                    troops,
                });
            }
        }
    }

    commands
}
