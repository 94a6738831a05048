//! Hierarchical villager decision engine
//!
//! Goals (`goal`) pick what matters, the controller maps the goal to a task
//! token, and the action machine (`action`) drives the executor through
//! find, move, collect, store and use steps.

pub mod action;
pub mod collection;
pub mod controller;
pub mod executor;
pub mod goal;
pub mod targeting;

pub use action::{transition, Action, ActionContext, Effect, Facts, Target, Task, TRANSITIONS};
pub use collection::CollectionManager;
pub use controller::{execute_action_sequence, update, Brain};
pub use goal::{Goal, GoalEvaluator};

use crate::core::config::SimulationConfig;
use crate::pathfinding::Pathfinder;
use crate::simulation::events::SimulationEvent;
use crate::world::entities::Entities;
use crate::world::resources::ResourceCatalog;
use crate::world::storage::Storages;
use crate::world::terrain::Terrain;

/// Shared world state one villager's update may read and mutate
pub struct AiContext<'a> {
    pub entities: &'a mut Entities,
    pub storages: &'a mut Storages,
    pub terrain: &'a Terrain,
    pub pathfinder: &'a Pathfinder<'a>,
    pub catalog: &'a dyn ResourceCatalog,
    pub config: &'a SimulationConfig,
    /// Seconds since start
    pub now: f64,
    pub hour: f32,
    pub dt: f32,
    pub events: &'a mut Vec<SimulationEvent>,
}
