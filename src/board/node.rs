//! Nodes, teams, and buildings.
//!
//! A node is a vertex of the generated map. Its position and adjacency are
//! fixed once the map exists; ownership, troops, building, and standing
//! order change over the course of a game.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// The number of playable teams.
pub const TEAM_COUNT: usize = 6;

/// A playable team. Neutral ownership is expressed as `Option<Team>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Team {
    Red = 0,
    Blue = 1,
    Green = 2,
    Yellow = 3,
    Purple = 4,
    Orange = 5,
}

/// All teams in index order.
pub const ALL_TEAMS: [Team; TEAM_COUNT] = [
    Team::Red,
    Team::Blue,
    Team::Green,
    Team::Yellow,
    Team::Purple,
    Team::Orange,
];

impl Team {
    /// Returns the lowercase team name.
    pub const fn name(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
            Team::Green => "green",
            Team::Yellow => "yellow",
            Team::Purple => "purple",
            Team::Orange => "orange",
        }
    }

    /// Parses a team from its name or its index (`"blue"` or `"1"`).
    pub fn from_name(s: &str) -> Option<Team> {
        if let Ok(idx) = s.parse::<usize>() {
            return ALL_TEAMS.get(idx).copied();
        }
        ALL_TEAMS
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structure a team can build on a node it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Building {
    #[default]
    None,
    Factory,
    PowerPlant,
    Fort,
    Artillery,
}

impl Building {
    /// Parses a building from its snake_case name.
    pub fn from_name(s: &str) -> Option<Building> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(Building::None),
            "factory" => Some(Building::Factory),
            "power_plant" | "powerplant" => Some(Building::PowerPlant),
            "fort" => Some(Building::Fort),
            "artillery" => Some(Building::Artillery),
            _ => None,
        }
    }
}

/// Stable node identifier; equal to the node's index in the map arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vertex of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub pos: Point,
    pub owner: Option<Team>,
    pub troops: u32,
    pub building: Building,
    pub adjacent: Vec<NodeId>,
    /// Target of this node's standing supply order, if any.
    pub standing_order: Option<NodeId>,
    /// Set by node combat; suppresses the next production step.
    pub attacked: bool,
}

impl Node {
    /// Creates an unowned, empty node with no neighbors.
    pub fn new(id: NodeId, pos: Point) -> Self {
        Node {
            id,
            pos,
            owner: None,
            troops: 0,
            building: Building::None,
            adjacent: Vec::new(),
            standing_order: None,
            attacked: false,
        }
    }

    pub fn degree(&self) -> usize {
        self.adjacent.len()
    }

    pub fn is_adjacent(&self, other: NodeId) -> bool {
        self.adjacent.contains(&other)
    }

    pub fn is_owned_by(&self, team: Team) -> bool {
        self.owner == Some(team)
    }

    /// Returns the node to neutral with no troops, building, or order.
    pub fn reset(&mut self) {
        self.owner = None;
        self.troops = 0;
        self.building = Building::None;
        self.standing_order = None;
    }

    /// Runs one production step.
    ///
    /// `power_plants` is the number of adjacent nodes owned by the same team
    /// that carry a power plant. Production only happens on even ticks and
    /// never right after the node was attacked; the attacked flag is cleared
    /// either way.
    pub fn produce(&mut self, tick: u64, power_plants: u32) {
        let attacked = std::mem::take(&mut self.attacked);
        if tick % 2 != 0 || attacked {
            return;
        }
        let gain = if self.building == Building::Factory {
            2 * (1 + power_plants)
        } else {
            1
        };
        self.troops = self.troops.saturating_add(gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new(NodeId(0), Point::new(0.0, 0.0))
    }

    #[test]
    fn team_names_roundtrip() {
        for team in ALL_TEAMS {
            assert_eq!(Team::from_name(team.name()), Some(team));
        }
        assert_eq!(Team::from_name("2"), Some(Team::Green));
        assert_eq!(Team::from_name("BLUE"), Some(Team::Blue));
        assert_eq!(Team::from_name("9"), None);
        assert_eq!(Team::from_name("grey"), None);
    }

    #[test]
    fn building_names_parse() {
        assert_eq!(Building::from_name("factory"), Some(Building::Factory));
        assert_eq!(Building::from_name("power_plant"), Some(Building::PowerPlant));
        assert_eq!(Building::from_name("Artillery"), Some(Building::Artillery));
        assert_eq!(Building::from_name("castle"), None);
    }

    #[test]
    fn produce_skips_odd_ticks() {
        let mut n = node();
        n.produce(1, 0);
        assert_eq!(n.troops, 0);
        n.produce(2, 0);
        assert_eq!(n.troops, 1);
    }

    #[test]
    fn factory_scales_with_power_plants() {
        let mut n = node();
        n.building = Building::Factory;
        n.produce(2, 0);
        assert_eq!(n.troops, 2);
        n.produce(4, 2);
        assert_eq!(n.troops, 8);
    }

    #[test]
    fn attacked_flag_suppresses_one_step_and_clears() {
        let mut n = node();
        n.attacked = true;
        n.produce(2, 0);
        assert_eq!(n.troops, 0);
        assert!(!n.attacked);
        n.produce(4, 0);
        assert_eq!(n.troops, 1);
    }

    #[test]
    fn attacked_flag_clears_on_odd_tick() {
        let mut n = node();
        n.attacked = true;
        n.produce(3, 0);
        assert!(!n.attacked);
    }

    #[test]
    fn reset_returns_to_neutral() {
        let mut n = node();
        n.owner = Some(Team::Red);
        n.troops = 40;
        n.building = Building::Fort;
        n.standing_order = Some(NodeId(3));
        n.reset();
        assert_eq!(n.owner, None);
        assert_eq!(n.troops, 0);
        assert_eq!(n.building, Building::None);
        assert_eq!(n.standing_order, None);
    }
}
