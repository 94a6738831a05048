//! Waypoint following for one agent
//!
//! Walks a planned path one waypoint at a time. Replans when the path is
//! used up or the live target drifts away from the planned destination. A
//! stuck timer snaps the agent onto its next waypoint. There is no
//! straight-line fallback: without a path the agent stays put.

use crate::core::config::MovementConfig;
use crate::core::types::Vec2;
use crate::pathfinding::cache::PathCache;
use crate::pathfinding::Pathfinder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// Still walking the current path
    Moving,
    /// Reached the last waypoint
    PathComplete,
    /// No path available this tick; position unchanged
    NoPath,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    path: Vec<Vec2>,
    next: usize,
    destination: Option<Vec2>,
    stuck_timer: f32,
    pub cache: PathCache,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current path (the cache survives)
    pub fn clear(&mut self) {
        self.path.clear();
        self.next = 0;
        self.destination = None;
        self.stuck_timer = 0.0;
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    fn drifted(&self, target: Vec2, drift_tolerance: f32) -> bool {
        self.destination
            .map_or(true, |d| d.distance(&target) > drift_tolerance)
    }

    /// Walked every waypoint of a non-empty path
    pub fn finished(&self) -> bool {
        !self.path.is_empty() && self.next >= self.path.len()
    }

    /// Advance `position` towards `target` for one tick
    #[allow(clippy::too_many_arguments)]
    pub fn move_towards(
        &mut self,
        position: &mut Vec2,
        target: Vec2,
        speed: f32,
        dt: f32,
        pathfinder: &Pathfinder,
        movement: &MovementConfig,
        now: f64,
    ) -> MoveStatus {
        let drifted = self.drifted(target, movement.target_drift_tolerance);
        if self.finished() && !drifted {
            // Goal cell reached; the caller handles the rest of the approach
            return MoveStatus::PathComplete;
        }
        if drifted || self.next >= self.path.len() {
            let Some(path) = pathfinder.find_path(*position, target, &mut self.cache, now) else {
                self.clear();
                return MoveStatus::NoPath;
            };
            // Skip the center of the cell we are already standing in
            let here = pathfinder.world_to_grid(*position);
            let skip = path.len() > 1 && pathfinder.world_to_grid(path[0]) == here;
            self.path = path;
            self.next = usize::from(skip);
            self.destination = Some(target);
            self.stuck_timer = 0.0;
        }

        let waypoint = self.path[self.next];
        *position = position.step_towards(waypoint, speed * dt);

        if position.distance(&waypoint) <= movement.arrival_radius {
            self.next += 1;
            self.stuck_timer = 0.0;
        } else {
            self.stuck_timer += dt;
            if self.stuck_timer >= movement.stuck_timeout {
                tracing::debug!("Stuck for {:.1}s, snapping to {:?}", self.stuck_timer, waypoint);
                *position = waypoint;
                self.next += 1;
                self.stuck_timer = 0.0;
            }
        }

        if self.next >= self.path.len() {
            MoveStatus::PathComplete
        } else {
            MoveStatus::Moving
        }
    }
}
