//! Grid path planning: A* search, per-agent caching and waypoint following

pub mod astar;
pub mod cache;
pub mod navigator;

pub use astar::{find_cell_path, SearchFailure};
pub use cache::{CacheStats, PathCache};
pub use navigator::{MoveStatus, Navigator};

use crate::core::config::PathfindingConfig;
use crate::core::types::Vec2;
use crate::spatial::blocked::BlockedCellTable;
use crate::spatial::grid::GridCell;

/// Planner over a built blocked-cell table. Cheap to construct; borrows the
/// static terrain tables for the duration of a tick.
pub struct Pathfinder<'a> {
    blocked: &'a BlockedCellTable,
    config: &'a PathfindingConfig,
}

impl<'a> Pathfinder<'a> {
    pub fn new(blocked: &'a BlockedCellTable, config: &'a PathfindingConfig) -> Self {
        Self { blocked, config }
    }

    pub fn world_to_grid(&self, pos: Vec2) -> GridCell {
        self.blocked.world_to_grid(pos)
    }

    pub fn grid_to_world(&self, cell: GridCell) -> Vec2 {
        self.blocked.grid_to_world(cell)
    }

    /// Uncached search; waypoints are cell centers from start to goal
    pub fn plan(&self, start: Vec2, target: Vec2) -> Result<Vec<Vec2>, SearchFailure> {
        let cells = find_cell_path(
            self.blocked,
            self.world_to_grid(start),
            self.world_to_grid(target),
            self.config.max_expansions,
            self.config.relocate_radius,
        )?;
        Ok(cells.into_iter().map(|c| self.grid_to_world(c)).collect())
    }

    /// Per-agent entry point.
    ///
    /// Reuses the cached path when the (start cell, goal cell) key matches,
    /// otherwise searches at most once per `replan_interval`. `None` means
    /// the agent should not move this tick.
    pub fn find_path(
        &self,
        start: Vec2,
        target: Vec2,
        cache: &mut PathCache,
        now: f64,
    ) -> Option<Vec<Vec2>> {
        let key = (self.world_to_grid(start), self.world_to_grid(target));
        if let Some(path) = cache.lookup(key) {
            return Some(path.to_vec());
        }
        if cache.throttled(now, self.config.replan_interval) {
            return None;
        }

        cache.record_search(now);
        match self.plan(start, target) {
            Ok(path) => {
                cache.store(key, path.clone());
                Some(path)
            }
            Err(failure) => {
                cache.record_failure();
                tracing::debug!(
                    "No path from {:?} to {:?}: {:?}",
                    key.0,
                    key.1,
                    failure
                );
                None
            }
        }
    }
}
