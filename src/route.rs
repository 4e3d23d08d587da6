//! Constrained shortest-path routing.
//!
//! Armies may only travel through nodes their team owns; the destination is
//! the single exception. Routing picks the first hop of the shortest such
//! path, weighting edges by their Euclidean length.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::board::{Map, NodeId, Team};

/// Open-set entry, ordered so that `BinaryHeap` pops the nearest node first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    node: NodeId,
    cost: f64,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the first hop from `from` toward `to` for an army of `team`.
///
/// The path may pass only through nodes owned by `team`, plus `to` itself.
/// Returns `None` when no such path exists, when either id is unknown, or
/// when `from == to`.
pub fn route(map: &Map, from: NodeId, to: NodeId, team: Team) -> Option<NodeId> {
    shortest_path(map, from, to, team).and_then(|path| path.get(1).copied())
}

/// Returns the full node sequence `from ..= to` of the shortest allowed path.
pub fn shortest_path(map: &Map, from: NodeId, to: NodeId, team: Team) -> Option<Vec<NodeId>> {
    if from == to || !map.contains(from) || !map.contains(to) {
        return None;
    }

    let n = map.len();
    let mut best = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<NodeId>> = vec![None; n];
    let mut open = BinaryHeap::new();

    best[from.index()] = 0.0;
    open.push(Frontier { node: from, cost: 0.0 });

    while let Some(Frontier { node, cost }) = open.pop() {
        if node == to {
            return Some(reconstruct(&prev, to));
        }
        if cost > best[node.index()] {
            continue;
        }

        for &next in &map.nodes()[node.index()].adjacent {
            let passable = next == to || map.nodes()[next.index()].is_owned_by(team);
            if !passable {
                continue;
            }
            let tentative = cost + map.distance(node, next);
            if tentative < best[next.index()] {
                best[next.index()] = tentative;
                prev[next.index()] = Some(node);
                open.push(Frontier {
                    node: next,
                    cost: tentative,
                });
            }
        }
    }

    None
}

fn reconstruct(prev: &[Option<NodeId>], to: NodeId) -> Vec<NodeId> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(p) = prev[current.index()] {
        path.push(p);
        current = p;
    }
    path.reverse();
    path
}
