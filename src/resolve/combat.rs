//! Stochastic combat resolution.
//!
//! Both sides of a fight lose the same randomized fraction of their troops
//! per round: the smaller pool rolls its loss, and the larger pool's loss is
//! that roll scaled by the size ratio. Modifiers from forts and artillery
//! scale the losses before they are rounded up and subtracted.

use rand::Rng;

use crate::board::{Army, Building, Node, Team};
use crate::config::Rules;

/// Result of an army's assault on a hostile node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeBattle {
    /// The defenders fell and the attacker took the node with its survivors.
    Captured { survivors: u32 },
    /// Both sides were wiped out; the node reverted to neutral.
    Razed,
    /// The attacker was wiped out and the node held.
    Repelled,
}

/// Losses inflicted on each side of a field battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLosses {
    pub first: u32,
    pub second: u32,
}

fn roll(rules: &Rules, rng: &mut impl Rng) -> f64 {
    rng.gen_range(1.0 - rules.loss_spread..=1.0 + rules.loss_spread)
}

fn base_loss(troops: u32, rules: &Rules, rng: &mut impl Rng) -> f64 {
    f64::from(troops) * rules.loss_rate * roll(rules, rng)
}

/// Raw (unmodified, unrounded) losses for two troop pools.
///
/// Returns `(loss_of_a, loss_of_b)`. An empty pool neither takes nor
/// inflicts losses.
pub fn proportional_losses(a: u32, b: u32, rules: &Rules, rng: &mut impl Rng) -> (f64, f64) {
    if a == 0 || b == 0 {
        return (0.0, 0.0);
    }
    if a == b {
        return (base_loss(a, rules, rng), base_loss(b, rules, rng));
    }
    let (small, large) = if a < b { (a, b) } else { (b, a) };
    let small_loss = base_loss(small, rules, rng);
    let large_loss = small_loss * f64::from(large) / f64::from(small);
    if a < b {
        (small_loss, large_loss)
    } else {
        (large_loss, small_loss)
    }
}

/// Scales a raw loss and rounds it up to whole troops.
pub fn modified_loss(raw: f64, multiplier: f64) -> u32 {
    let scaled = (raw * multiplier).ceil();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Fights an arriving army against a hostile node until one side is gone.
///
/// Rounds repeat within the same tick, each with a fresh roll. `origin_artillery`
/// is true when the army's origin node belongs to the army's team and carries
/// artillery. The army is always consumed: into the captured node, together
/// with the node, or by the defenders. The node is marked attacked.
pub fn node_combat(
    army: &mut Army,
    node: &mut Node,
    origin_artillery: bool,
    rules: &Rules,
    rng: &mut impl Rng,
) -> NodeBattle {
    let mut defender_multiplier = 1.0;
    if node.building == Building::Fort {
        defender_multiplier *= rules.fort_multiplier;
    }
    if origin_artillery {
        defender_multiplier *= rules.artillery_multiplier;
    }
    let attacker_multiplier = if node.building == Building::Artillery {
        rules.artillery_multiplier
    } else {
        1.0
    };

    node.attacked = true;
    let mut attackers = army.troops;
    let mut defenders = node.troops;
    army.troops = 0;

    while attackers > 0 && defenders > 0 {
        let (raw_attacker, raw_defender) = proportional_losses(attackers, defenders, rules, rng);
        let attacker_loss = modified_loss(raw_attacker, attacker_multiplier);
        let defender_loss = modified_loss(raw_defender, defender_multiplier);
        if attacker_loss == 0 && defender_loss == 0 {
            // Degenerate rules that inflict nothing leave the node standing.
            node.troops = defenders;
            return NodeBattle::Repelled;
        }
        attackers = attackers.saturating_sub(attacker_loss);
        defenders = defenders.saturating_sub(defender_loss);
    }

    if defenders > 0 {
        node.troops = defenders;
        return NodeBattle::Repelled;
    }
    node.standing_order = None;
    if attackers == 0 {
        node.reset();
        return NodeBattle::Razed;
    }
    node.owner = Some(army.owner);
    node.troops = attackers;
    NodeBattle::Captured {
        survivors: attackers,
    }
}

/// Fights one round between two hostile armies.
///
/// Each `*_artillery` flag marks that side's origin node as its own and
/// armed with artillery, which multiplies the losses that side inflicts.
pub fn army_combat(
    first: &mut Army,
    second: &mut Army,
    first_artillery: bool,
    second_artillery: bool,
    rules: &Rules,
    rng: &mut impl Rng,
) -> FieldLosses {
    let (raw_first, raw_second) = proportional_losses(first.troops, second.troops, rules, rng);
    let bonus = |armed: bool| {
        if armed {
            rules.army_artillery_multiplier
        } else {
            1.0
        }
    };
    let losses = FieldLosses {
        first: modified_loss(raw_first, bonus(second_artillery)),
        second: modified_loss(raw_second, bonus(first_artillery)),
    };
    first.troops = first.troops.saturating_sub(losses.first);
    second.troops = second.troops.saturating_sub(losses.second);
    losses
}

/// True if `node` belongs to `team` and carries artillery.
pub fn artillery_support(node: Option<&Node>, team: Team) -> bool {
    node.is_some_and(|n| n.is_owned_by(team) && n.building == Building::Artillery)
}
