//! Armies in transit between nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{NodeId, Team};

/// Identifier of an army, unique and increasing within one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArmyId(pub u64);

impl fmt::Display for ArmyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A body of troops travelling along one edge toward a final destination.
///
/// `from` is the node the army left; its building and owner decide the
/// artillery bonus in combat. `to` is the adjacent node the army is heading
/// for, and `destination` is where it continues once it arrives there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Army {
    pub id: ArmyId,
    pub owner: Team,
    pub from: NodeId,
    pub to: NodeId,
    pub destination: NodeId,
    pub troops: u32,
    /// Ticks travelled along `from`-`to`.
    pub progress: u32,
}

impl Army {
    pub fn is_alive(&self) -> bool {
        self.troops > 0
    }

    /// True if both armies travel the same edge in the same direction.
    pub fn same_lane(&self, other: &Army) -> bool {
        self.from == other.from && self.to == other.to
    }

    /// True if both armies travel the same edge in opposite directions.
    pub fn opposing_lane(&self, other: &Army) -> bool {
        self.from == other.to && self.to == other.from
    }
}
