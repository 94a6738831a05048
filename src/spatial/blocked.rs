//! Blocked cells for pathfinding
//!
//! Precomputed once after every obstacle and gate exists. A cell is blocked
//! when its center lies too close to an obstacle (half a cell plus the safety
//! margin) or to a lethal gate (half a cell). Terrain is static for a
//! session, so the table is never updated afterwards.

use crate::core::config::PathfindingConfig;
use crate::core::types::Vec2;
use crate::spatial::grid::{Grid, GridCell};
use crate::spatial::partition::ObstaclePartition;
use crate::world::terrain::Gate;

#[derive(Debug, Clone)]
pub struct BlockedCellTable {
    grid: Grid<bool>,
    blocked: usize,
}

impl BlockedCellTable {
    pub fn build(
        world_width: f32,
        world_height: f32,
        config: &PathfindingConfig,
        obstacles: &ObstaclePartition,
        gates: &[Gate],
    ) -> Self {
        let mut grid: Grid<bool> = Grid::covering(world_width, world_height, config.cell_size);
        let half = config.cell_size * 0.5;
        let obstacle_radius = half + config.obstacle_margin;

        let lethal: Vec<&Gate> = gates.iter().filter(|g| g.lethal).collect();
        let mut blocked = 0;
        let cells: Vec<GridCell> = grid.cells().collect();
        for cell in cells {
            let center = grid.cell_center(cell);
            let hit = obstacles.any_within(center, obstacle_radius)
                || lethal.iter().any(|g| g.rect.intersects_circle(center, half));
            if hit {
                grid.set(cell, true);
                blocked += 1;
            }
        }

        Self { grid, blocked }
    }

    /// Out-of-bounds cells count as blocked
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.grid.get(cell).copied().unwrap_or(true)
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        self.grid.in_bounds(cell)
    }

    pub fn world_to_grid(&self, pos: Vec2) -> GridCell {
        self.grid.world_to_cell(pos)
    }

    pub fn grid_to_world(&self, cell: GridCell) -> Vec2 {
        self.grid.cell_center(cell)
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked
    }

    /// Closest open cell by ring distance, scanning rings up to `max_radius`
    pub fn nearest_open(&self, cell: GridCell, max_radius: i32) -> Option<GridCell> {
        if !self.is_blocked(cell) {
            return Some(cell);
        }
        for r in 1..=max_radius {
            let mut best: Option<(i32, GridCell)> = None;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let candidate = GridCell::new(cell.x + dx, cell.y + dy);
                    if self.is_blocked(candidate) {
                        continue;
                    }
                    let d = dx * dx + dy * dy;
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, candidate));
                    }
                }
            }
            if let Some((_, found)) = best {
                return Some(found);
            }
        }
        None
    }
}
