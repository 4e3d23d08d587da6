//! Board representation.
//!
//! Contains the map arena, nodes, armies, and the planar geometry used to
//! generate the graph.

pub mod army;
pub mod geometry;
pub mod map;
pub mod node;

pub use army::{Army, ArmyId};
pub use geometry::{orientation, segments_intersect, Orientation, Point};
pub use map::{Edge, Map};
pub use node::{Building, Node, NodeId, Team, ALL_TEAMS, TEAM_COUNT};
