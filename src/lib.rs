//! Villager Sim - settlement survival with hierarchical villager AI
//!
//! Villagers keep their needs satisfied, contribute surplus to a communal
//! store and walk a grid planned around walls and lethal gates.

pub mod ai;
pub mod core;
pub mod entity;
pub mod pathfinding;
pub mod simulation;
pub mod spatial;
pub mod world;
