//! Flat, id-based game snapshots.
//!
//! A snapshot is the broadcast form of a game: the node list with each
//! node's neighbor ids, the edge list as id pairs, and the active armies.
//! Nothing in it is recursive, so it serializes directly to JSON. Restoring
//! a snapshot re-links every id and rejects references that do not resolve.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Army, ArmyId, Building, Edge, Map, NodeId, Point, Team};
use crate::config::GameConfig;
use crate::game::Game;

/// Errors that can occur while restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node at index {index} has id {id}")]
    NodeIdMismatch { index: usize, id: NodeId },

    #[error("reference to unknown node {0}")]
    UnknownNode(NodeId),

    #[error("duplicate or self-looping edge {0}-{1}")]
    BadEdge(NodeId, NodeId),

    #[error("neighbor list of node {0} disagrees with the edge list")]
    AdjacencyMismatch(NodeId),

    #[error("army {0} is not on an edge")]
    ArmyOffEdge(ArmyId),

    #[error("army {0} is past the end of its edge")]
    ProgressOutOfRange(ArmyId),

    #[error("army id {0} appears twice")]
    DuplicateArmy(ArmyId),

    #[error("army id {0} is out of range")]
    ArmyIdOutOfRange(ArmyId),
}

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub owner: Option<Team>,
    pub troops: u32,
    pub building: Building,
    pub standing_order: Option<NodeId>,
    pub neighbors: Vec<NodeId>,
}

/// Serialized form of one army.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmySnapshot {
    pub id: ArmyId,
    pub owner: Team,
    pub from: NodeId,
    pub to: NodeId,
    pub destination: NodeId,
    pub troops: u32,
    pub progress: u32,
}

/// Serialized form of a whole game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub tick: u64,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<Edge>,
    pub armies: Vec<ArmySnapshot>,
}

impl GameSnapshot {
    /// Captures the current state of a game.
    pub fn capture<R>(game: &Game<R>) -> GameSnapshot
    where
        R: Rng,
    {
        GameSnapshot::of(game.map(), game.armies(), game.current_tick())
    }

    /// Captures a map and army set.
    pub fn of(map: &Map, armies: &[Army], tick: u64) -> GameSnapshot {
        let nodes = map
            .nodes()
            .iter()
            .map(|n| NodeSnapshot {
                id: n.id,
                x: n.pos.x,
                y: n.pos.y,
                owner: n.owner,
                troops: n.troops,
                building: n.building,
                standing_order: n.standing_order,
                neighbors: n.adjacent.clone(),
            })
            .collect();
        let armies = armies
            .iter()
            .map(|a| ArmySnapshot {
                id: a.id,
                owner: a.owner,
                from: a.from,
                to: a.to,
                destination: a.destination,
                troops: a.troops,
                progress: a.progress,
            })
            .collect();
        GameSnapshot {
            tick,
            nodes,
            edges: map.edges().to_vec(),
            armies,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<GameSnapshot, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Rebuilds the map, checking every id and the neighbor lists.
    pub fn restore_map(&self) -> Result<Map, SnapshotError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(SnapshotError::NodeIdMismatch { index, id: node.id });
            }
        }

        let count = self.nodes.len();
        let known = |id: NodeId| -> Result<u32, SnapshotError> {
            if id.index() < count {
                Ok(id.0)
            } else {
                Err(SnapshotError::UnknownNode(id))
            }
        };

        let mut pairs = Vec::with_capacity(self.edges.len());
        for &Edge(a, b) in &self.edges {
            let pair = (known(a)?, known(b)?);
            if a == b || pairs.contains(&pair) || pairs.contains(&(pair.1, pair.0)) {
                return Err(SnapshotError::BadEdge(a, b));
            }
            pairs.push(pair);
        }

        let positions: Vec<Point> = self.nodes.iter().map(|n| Point::new(n.x, n.y)).collect();
        let mut map = Map::from_edges(&positions, &pairs);

        for snap in &self.nodes {
            if let Some(target) = snap.standing_order {
                known(target)?;
            }
            let node = map
                .node_mut(snap.id)
                .ok_or(SnapshotError::UnknownNode(snap.id))?;
            let mut listed = snap.neighbors.clone();
            let mut actual = node.adjacent.clone();
            listed.sort();
            actual.sort();
            if listed != actual {
                return Err(SnapshotError::AdjacencyMismatch(snap.id));
            }
            node.owner = snap.owner;
            node.troops = snap.troops;
            node.building = snap.building;
            node.standing_order = snap.standing_order;
        }

        Ok(map)
    }

    /// Rebuilds the army set against a restored map.
    pub fn restore_armies(&self, map: &Map) -> Result<Vec<Army>, SnapshotError> {
        let mut armies: Vec<Army> = Vec::with_capacity(self.armies.len());
        for snap in &self.armies {
            if snap.id.0 == u64::MAX {
                return Err(SnapshotError::ArmyIdOutOfRange(snap.id));
            }
            for id in [snap.from, snap.to, snap.destination] {
                if !map.contains(id) {
                    return Err(SnapshotError::UnknownNode(id));
                }
            }
            let on_edge = map
                .node(snap.from)
                .is_some_and(|n| n.is_adjacent(snap.to));
            if !on_edge {
                return Err(SnapshotError::ArmyOffEdge(snap.id));
            }
            if snap.progress > map.edge_ticks(snap.from, snap.to) {
                return Err(SnapshotError::ProgressOutOfRange(snap.id));
            }
            if armies.iter().any(|a| a.id == snap.id) {
                return Err(SnapshotError::DuplicateArmy(snap.id));
            }
            armies.push(Army {
                id: snap.id,
                owner: snap.owner,
                from: snap.from,
                to: snap.to,
                destination: snap.destination,
                troops: snap.troops,
                progress: snap.progress,
            });
        }
        Ok(armies)
    }

    /// Restores a playable game from this snapshot.
    pub fn restore<R: Rng>(&self, config: GameConfig, rng: R) -> Result<Game<R>, SnapshotError> {
        let map = self.restore_map()?;
        let armies = self.restore_armies(&map)?;
        Ok(Game::from_parts(config, map, armies, self.tick, rng))
    }
}
