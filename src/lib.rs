//! Nodewar simulation library.
//!
//! Exposes the board representation, routing, combat and movement
//! resolution, the game orchestrator, snapshots, and the driver protocol for
//! use by integration tests and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod route;
pub mod selfplay;

pub use board::{Army, ArmyId, Building, Map, Node, NodeId, Team};
pub use config::GameConfig;
pub use game::{CommandError, Game};
