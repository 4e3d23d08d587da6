//! Tick resolution.
//!
//! Moves armies along their edges, resolves merges and collisions, and
//! fights node and field battles.

pub mod combat;
pub mod movement;

pub use combat::{army_combat, node_combat, proportional_losses, FieldLosses, NodeBattle};
pub use movement::{resolve_armies, Continuation, MovementOutcome};
