//! Per-tick army resolution.
//!
//! Armies are processed closest-to-arrival first. That ordering lets a
//! leading army move out of the way before the army behind it checks for a
//! collision, so two armies marching in file never block each other unless
//! the leader is itself stopped.

use rand::Rng;

use super::combat::{army_combat, artillery_support, node_combat, NodeBattle};
use crate::board::{Army, Map, NodeId, Team};
use crate::config::Rules;

/// A follow-on send for troops that reached a friendly node short of their
/// final destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    pub team: Team,
    pub from: NodeId,
    pub to: NodeId,
    pub troops: u32,
}

/// Everything one tick of army resolution produced.
#[derive(Debug, Clone, Default)]
pub struct MovementOutcome {
    /// Armies still alive, in processing order.
    pub armies: Vec<Army>,
    pub continuations: Vec<Continuation>,
    /// Nodes that changed hands this tick, with their new owner.
    pub captures: Vec<(NodeId, Team)>,
}

/// What an in-transit army runs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collision {
    /// Friendly army directly ahead with the same destination.
    Merge(usize),
    /// Friendly army directly ahead bound elsewhere.
    Wait,
    /// Hostile army directly ahead or meeting head-on.
    Fight(usize),
}

/// Advances every army by one tick.
///
/// Arrivals merge into friendly nodes or fight hostile ones; in-transit
/// armies merge, queue, fight, or step forward. Dead armies are dropped from
/// the returned set.
pub fn resolve_armies(
    map: &mut Map,
    mut armies: Vec<Army>,
    rules: &Rules,
    rng: &mut impl Rng,
) -> MovementOutcome {
    armies.sort_by(|a, b| b.progress.cmp(&a.progress).then(a.id.cmp(&b.id)));

    let mut engaged = vec![false; armies.len()];
    let mut outcome = MovementOutcome::default();

    for i in 0..armies.len() {
        if engaged[i] || !armies[i].is_alive() {
            continue;
        }
        let length = map.edge_ticks(armies[i].from, armies[i].to);

        if armies[i].progress >= length {
            armies[i].progress = length;
            arrive(map, &mut armies[i], rules, rng, &mut outcome);
            continue;
        }

        match find_collision(&armies, i, length) {
            Some(Collision::Merge(j)) => {
                let troops = std::mem::take(&mut armies[i].troops);
                armies[j].troops = armies[j].troops.saturating_add(troops);
            }
            Some(Collision::Wait) => {}
            Some(Collision::Fight(j)) => {
                let (me, other) = pair_mut(&mut armies, i, j);
                let my_artillery = artillery_support(map.node(me.from), me.owner);
                let their_artillery = artillery_support(map.node(other.from), other.owner);
                army_combat(me, other, my_artillery, their_artillery, rules, rng);
                engaged[i] = true;
                engaged[j] = true;
            }
            None => {
                armies[i].progress += 1;
                if armies[i].progress == length {
                    arrive(map, &mut armies[i], rules, rng, &mut outcome);
                }
            }
        }
    }

    armies.retain(Army::is_alive);
    outcome.armies = armies;
    outcome
}

/// Resolves an army standing at the end of its edge. The army is consumed
/// whatever the node's owner.
fn arrive(
    map: &mut Map,
    army: &mut Army,
    rules: &Rules,
    rng: &mut impl Rng,
    outcome: &mut MovementOutcome,
) {
    let origin_artillery = artillery_support(map.node(army.from), army.owner);
    let Some(node) = map.node_mut(army.to) else {
        army.troops = 0;
        return;
    };

    if node.is_owned_by(army.owner) {
        node.troops = node.troops.saturating_add(army.troops);
        if army.destination != army.to {
            outcome.continuations.push(Continuation {
                team: army.owner,
                from: army.to,
                to: army.destination,
                troops: army.troops,
            });
        }
        army.troops = 0;
        return;
    }

    match node_combat(army, node, origin_artillery, rules, rng) {
        NodeBattle::Captured { survivors } => {
            outcome.captures.push((node.id, army.owner));
            if army.destination != army.to {
                outcome.continuations.push(Continuation {
                    team: army.owner,
                    from: army.to,
                    to: army.destination,
                    troops: survivors,
                });
            }
        }
        NodeBattle::Razed => {
            tracing::debug!(node = %node.id, team = %army.owner, "node razed");
        }
        NodeBattle::Repelled => {}
    }
}

fn find_collision(armies: &[Army], i: usize, length: u32) -> Option<Collision> {
    let me = &armies[i];
    for (j, other) in armies.iter().enumerate() {
        if j == i || !other.is_alive() {
            continue;
        }
        if me.same_lane(other) && other.progress == me.progress + 1 {
            return Some(if other.owner != me.owner {
                Collision::Fight(j)
            } else if other.destination == me.destination {
                Collision::Merge(j)
            } else {
                Collision::Wait
            });
        }
        // Opposing armies whose positions meet or have crossed this tick.
        if me.opposing_lane(other)
            && other.owner != me.owner
            && me.progress + other.progress + 1 >= length
        {
            return Some(Collision::Fight(j));
        }
    }
    None
}

fn pair_mut(armies: &mut [Army], i: usize, j: usize) -> (&mut Army, &mut Army) {
    if i < j {
        let (left, right) = armies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = armies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
