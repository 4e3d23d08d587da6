//! The map arena and its procedural generator.
//!
//! Nodes live in a flat vector indexed by `NodeId`; adjacency is stored as
//! id lists on each node. The generator grows the graph breadth-first from a
//! single origin node, placing each new node on a ring of candidate positions
//! around the node being expanded and linking it to every nearby node it can
//! reach without crossing an existing edge.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{segments_intersect, Point};
use super::node::{Building, Node, NodeId, Team};
use crate::config::MapParams;

/// Candidate angles generated per unit of maximum degree.
const ANGLE_RESOLUTION: usize = 4;

/// An undirected edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge(pub NodeId, pub NodeId);

impl Edge {
    pub fn touches(self, id: NodeId) -> bool {
        self.0 == id || self.1 == id
    }
}

/// The node graph of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Map {
    /// Builds a map from node positions and an edge list.
    ///
    /// Node ids are assigned in position order. Edges referring to unknown
    /// ids, self-loops, and duplicates are skipped.
    pub fn from_edges(positions: &[Point], edges: &[(u32, u32)]) -> Map {
        let mut map = Map {
            nodes: positions
                .iter()
                .enumerate()
                .map(|(i, &p)| Node::new(NodeId(i as u32), p))
                .collect(),
            edges: Vec::with_capacity(edges.len()),
        };
        for &(a, b) in edges {
            let (a, b) = (NodeId(a), NodeId(b));
            if a == b || a.index() >= map.nodes.len() || b.index() >= map.nodes.len() {
                continue;
            }
            if map.nodes[a.index()].is_adjacent(b) {
                continue;
            }
            map.link(a, b);
        }
        map
    }

    /// Generates a connected map with non-crossing edges.
    ///
    /// Produces `params.node_count` nodes unless growth runs out of room
    /// first. Every edge length lies in `[min_distance, max_distance]` and no
    /// node exceeds `max_degree` neighbors.
    pub fn generate(params: &MapParams, rng: &mut impl Rng) -> Map {
        let mut map = Map {
            nodes: vec![Node::new(NodeId(0), Point::default())],
            edges: Vec::new(),
        };
        let mut queue = VecDeque::from([NodeId(0)]);

        while let Some(current) = queue.pop_front() {
            if map.nodes.len() >= params.node_count {
                break;
            }
            if map.nodes[current.index()].degree() >= params.max_degree {
                continue;
            }
            map.grow_from(current, params, rng, &mut queue);
        }

        map
    }

    /// Places as many new neighbors around `current` as its degree allows.
    fn grow_from(
        &mut self,
        current: NodeId,
        params: &MapParams,
        rng: &mut impl Rng,
        queue: &mut VecDeque<NodeId>,
    ) {
        let origin = self.nodes[current.index()].pos;
        let radius = 2.0 * params.max_distance;
        // An edge that reaches into the search radius has an endpoint within
        // half an edge length of it.
        let edge_radius = radius + params.max_distance;

        let mut nearby: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.pos.distance(origin) <= radius)
            .map(|n| n.id)
            .collect();
        let mut nearby_edges: Vec<Edge> = self
            .edges
            .iter()
            .copied()
            .filter(|e| {
                self.pos(e.0).distance(origin) <= edge_radius
                    || self.pos(e.1).distance(origin) <= edge_radius
            })
            .collect();

        // Keeps nodes visibly off the edges they are not part of.
        let clearance = params.min_distance / 4.0;

        let mut candidates = candidate_ring(origin, params);
        candidates.retain(|&c| {
            nearby
                .iter()
                .all(|&id| self.pos(id).distance(c) >= params.min_distance)
                && nearby_edges
                    .iter()
                    .all(|e| c.distance_to_segment(self.pos(e.0), self.pos(e.1)) >= clearance)
        });

        while self.nodes.len() < params.node_count
            && self.nodes[current.index()].degree() < params.max_degree
            && !candidates.is_empty()
        {
            let pick = candidates.swap_remove(rng.gen_range(0..candidates.len()));

            let mut links = Vec::new();
            for &target in &nearby {
                if links.len() >= params.max_degree {
                    break;
                }
                let node = &self.nodes[target.index()];
                if node.degree() >= params.max_degree {
                    continue;
                }
                let length = pick.distance(node.pos);
                if length < params.min_distance || length > params.max_distance {
                    continue;
                }
                let crosses = nearby_edges.iter().any(|e| {
                    !e.touches(target)
                        && segments_intersect(pick, node.pos, self.pos(e.0), self.pos(e.1))
                });
                let grazes = nearby.iter().any(|&other| {
                    other != target
                        && self.pos(other).distance_to_segment(pick, node.pos) < clearance
                });
                if !crosses && !grazes {
                    links.push(target);
                }
            }

            // A candidate that cannot link anywhere would be an island.
            if links.is_empty() {
                continue;
            }

            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(Node::new(id, pick));
            let links_added = links.len();
            for target in links {
                nearby_edges.push(self.link(id, target));
            }
            nearby.push(id);
            let new_edges = &nearby_edges[nearby_edges.len() - links_added..];
            candidates.retain(|&c| {
                c.distance(pick) >= params.min_distance
                    && new_edges
                        .iter()
                        .all(|e| c.distance_to_segment(self.pos(e.0), self.pos(e.1)) >= clearance)
            });
            queue.push_back(id);
        }
    }

    fn link(&mut self, a: NodeId, b: NodeId) -> Edge {
        self.nodes[a.index()].adjacent.push(b);
        self.nodes[b.index()].adjacent.push(a);
        let edge = Edge(a, b);
        self.edges.push(edge);
        edge
    }

    fn pos(&self, id: NodeId) -> Point {
        self.nodes[id.index()].pos
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Bounds-checked node lookup.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Euclidean distance between two nodes.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        self.pos(a).distance(self.pos(b))
    }

    /// Number of ticks an army needs to traverse the edge `a`-`b`.
    pub fn edge_ticks(&self, a: NodeId, b: NodeId) -> u32 {
        (self.distance(a, b).round() as u32).max(1)
    }

    /// Counts neighbors of `id` owned by `team` that carry a power plant.
    pub fn adjacent_power_plants(&self, id: NodeId, team: Team) -> u32 {
        self.nodes[id.index()]
            .adjacent
            .iter()
            .filter(|&&n| {
                let node = &self.nodes[n.index()];
                node.owner == Some(team) && node.building == Building::PowerPlant
            })
            .count() as u32
    }

    /// Returns true if every node can reach every other node.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([NodeId(0)]);
        seen[0] = true;
        while let Some(id) = queue.pop_front() {
            for &n in &self.nodes[id.index()].adjacent {
                if !seen[n.index()] {
                    seen[n.index()] = true;
                    queue.push_back(n);
                }
            }
        }
        seen.iter().all(|&s| s)
    }
}

/// Candidate positions around `origin`: one per integer distance in
/// `[min_distance, max_distance)` along each of `max_degree * 4` angles.
fn candidate_ring(origin: Point, params: &MapParams) -> Vec<Point> {
    let angles = params.max_degree * ANGLE_RESOLUTION;
    let first = params.min_distance.ceil();
    let mut out = Vec::new();
    for step in 0..angles {
        let angle = step as f64 * TAU / angles as f64;
        let mut d = first;
        while d < params.max_distance {
            out.push(origin.offset(angle, d));
            d += 1.0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn params(n: usize) -> MapParams {
        MapParams {
            node_count: n,
            ..MapParams::default()
        }
    }

    #[test]
    fn generates_requested_node_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let map = Map::generate(&params(40), &mut rng);
        assert_eq!(map.len(), 40);
        for (i, node) in map.nodes().iter().enumerate() {
            assert_eq!(node.id.index(), i);
        }
    }

    #[test]
    fn single_node_map() {
        let mut rng = SmallRng::seed_from_u64(1);
        let map = Map::generate(&params(1), &mut rng);
        assert_eq!(map.len(), 1);
        assert!(map.edges().is_empty());
        assert!(map.is_connected());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mut rng = SmallRng::seed_from_u64(11);
        let map = Map::generate(&params(30), &mut rng);
        for node in map.nodes() {
            for &n in &node.adjacent {
                assert!(map.node(n).unwrap().is_adjacent(node.id));
            }
        }
        let degree_sum: usize = map.nodes().iter().map(Node::degree).sum();
        assert_eq!(degree_sum, map.edges().len() * 2);
    }

    #[test]
    fn candidate_ring_size() {
        let p = MapParams::default();
        // 16 angles, distances 4..=8.
        assert_eq!(candidate_ring(Point::default(), &p).len(), 16 * 5);
    }

    #[test]
    fn from_edges_skips_bad_entries() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        let map = Map::from_edges(&pts, &[(0, 1), (1, 0), (1, 1), (1, 7), (1, 2)]);
        assert_eq!(map.edges().len(), 2);
        assert_eq!(map.node(NodeId(1)).unwrap().degree(), 2);
        assert!(map.is_connected());
    }

    #[test]
    fn edge_ticks_rounds_length() {
        let pts = [Point::new(0.0, 0.0), Point::new(4.6, 0.0)];
        let map = Map::from_edges(&pts, &[(0, 1)]);
        assert_eq!(map.edge_ticks(NodeId(0), NodeId(1)), 5);
    }

    #[test]
    fn node_lookup_is_bounds_checked() {
        let map = Map::from_edges(&[Point::default()], &[]);
        assert!(map.node(NodeId(0)).is_some());
        assert!(map.node(NodeId(1)).is_none());
    }

    #[test]
    fn power_plants_counted_for_team_only() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(0.0, 5.0)];
        let mut map = Map::from_edges(&pts, &[(0, 1), (0, 2)]);
        for id in [1, 2] {
            let n = map.node_mut(NodeId(id)).unwrap();
            n.building = Building::PowerPlant;
        }
        map.node_mut(NodeId(1)).unwrap().owner = Some(Team::Red);
        map.node_mut(NodeId(2)).unwrap().owner = Some(Team::Blue);
        assert_eq!(map.adjacent_power_plants(NodeId(0), Team::Red), 1);
        assert_eq!(map.adjacent_power_plants(NodeId(0), Team::Green), 0);
    }
}
