//! Driver protocol handling.
//!
//! This module implements the line-oriented command parser for the driver
//! loop and the flat JSON snapshot format used to broadcast and restore
//! games.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, Command};
pub use snapshot::{ArmySnapshot, GameSnapshot, NodeSnapshot, SnapshotError};
