//! A* pathfinding over the blocked-cell table
//!
//! 8-directional expansion with a Manhattan heuristic. The search is bounded
//! by an expansion budget and never returns a partial path.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::spatial::blocked::BlockedCellTable;
use crate::spatial::grid::GridCell;

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Why a search produced no path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// Start or goal is boxed in by blocked cells
    NoOpenCell,
    /// The open set ran dry
    Unreachable,
    /// Expansion budget spent before reaching the goal
    Exhausted { expanded: usize },
    /// Predecessor links looped or ran past the grid size
    BrokenChain,
}

/// Node in the A* open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    cell: GridCell,
    f_cost: OrderedFloat<f32>,
    h_cost: OrderedFloat<f32>,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties prefer the node closer to the goal,
        // then a fixed cell order so the search is deterministic
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: GridCell, b: GridCell) -> f32 {
    a.manhattan(&b) as f32
}

/// Find a cell path from `start` to `goal`, both inclusive.
///
/// Blocked endpoints are first moved to the nearest open cell within
/// `relocate_radius`.
pub fn find_cell_path(
    blocked: &BlockedCellTable,
    start: GridCell,
    goal: GridCell,
    max_expansions: usize,
    relocate_radius: i32,
) -> Result<Vec<GridCell>, SearchFailure> {
    let start = blocked
        .nearest_open(start, relocate_radius)
        .ok_or(SearchFailure::NoOpenCell)?;
    let goal = blocked
        .nearest_open(goal, relocate_radius)
        .ok_or(SearchFailure::NoOpenCell)?;

    if start == goal {
        return Ok(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<GridCell, GridCell> = AHashMap::new();
    let mut g_scores: AHashMap<GridCell, f32> = AHashMap::new();
    let mut closed: AHashSet<GridCell> = AHashSet::new();
    let mut expanded = 0usize;

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        cell: start,
        f_cost: OrderedFloat(heuristic(start, goal)),
        h_cost: OrderedFloat(heuristic(start, goal)),
    });

    while let Some(current) = open_set.pop() {
        if !closed.insert(current.cell) {
            continue;
        }
        if current.cell == goal {
            return reconstruct_path(&came_from, start, goal, blocked.cell_count());
        }

        expanded += 1;
        if expanded > max_expansions {
            return Err(SearchFailure::Exhausted { expanded });
        }

        let current_g = g_scores.get(&current.cell).copied().unwrap_or(f32::INFINITY);

        for (i, neighbor) in current.cell.neighbors().into_iter().enumerate() {
            if closed.contains(&neighbor) || blocked.is_blocked(neighbor) {
                continue;
            }

            // Diagonals come after the four orthogonals and may not cut a
            // blocked corner
            let diagonal = i >= 4;
            if diagonal
                && (blocked.is_blocked(GridCell::new(neighbor.x, current.cell.y))
                    || blocked.is_blocked(GridCell::new(current.cell.x, neighbor.y)))
            {
                continue;
            }

            let step = if diagonal { DIAGONAL_COST } else { 1.0 };
            let tentative_g = current_g + step;
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);

                let h = heuristic(neighbor, goal);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: OrderedFloat(tentative_g + h),
                    h_cost: OrderedFloat(h),
                });
            }
        }
    }

    Err(SearchFailure::Unreachable)
}

/// Walk predecessor links back to `start`
fn reconstruct_path(
    came_from: &AHashMap<GridCell, GridCell>,
    start: GridCell,
    goal: GridCell,
    max_len: usize,
) -> Result<Vec<GridCell>, SearchFailure> {
    let mut path = vec![goal];
    let mut visited = AHashSet::new();
    visited.insert(goal);

    let mut current = goal;
    while current != start {
        let Some(&prev) = came_from.get(&current) else {
            tracing::warn!("Path reconstruction lost its chain at {:?}", current);
            return Err(SearchFailure::BrokenChain);
        };
        if !visited.insert(prev) || path.len() > max_len {
            tracing::warn!("Path reconstruction looped at {:?}", prev);
            return Err(SearchFailure::BrokenChain);
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PathfindingConfig;
    use crate::core::types::Rect;
    use crate::spatial::partition::ObstaclePartition;

    fn table(obstacles: &[Rect]) -> BlockedCellTable {
        let config = PathfindingConfig {
            cell_size: 10.0,
            obstacle_margin: 0.0,
            ..PathfindingConfig::default()
        };
        let partition = ObstaclePartition::build(obstacles, 50.0);
        BlockedCellTable::build(200.0, 200.0, &config, &partition, &[])
    }

    #[test]
    fn test_pathfind_straight_line() {
        let blocked = table(&[]);
        let path = find_cell_path(&blocked, GridCell::new(0, 0), GridCell::new(5, 0), 1000, 0).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.first(), Some(&GridCell::new(0, 0)));
        assert_eq!(path.last(), Some(&GridCell::new(5, 0)));
    }

    #[test]
    fn test_pathfind_diagonal() {
        let blocked = table(&[]);
        let path = find_cell_path(&blocked, GridCell::new(0, 0), GridCell::new(9, 9), 1000, 0).unwrap();
        assert_eq!(path.len(), 10);
        for (i, cell) in path.iter().enumerate() {
            assert_eq!(*cell, GridCell::new(i as i32, i as i32));
        }
    }

    #[test]
    fn test_pathfind_around_obstacle() {
        // Wall across x = 50..60 for y in 0..150, leaving a gap at the bottom
        let blocked = table(&[Rect::new(50.0, 0.0, 10.0, 150.0)]);
        let path = find_cell_path(&blocked, GridCell::new(2, 5), GridCell::new(9, 5), 5000, 0).unwrap();
        assert!(path.iter().all(|c| !blocked.is_blocked(*c)));
        assert!(path.iter().any(|c| c.y >= 15));
    }

    #[test]
    fn test_pathfind_no_path() {
        // Full-height wall splits the map
        let blocked = table(&[Rect::new(50.0, 0.0, 10.0, 200.0)]);
        let result = find_cell_path(&blocked, GridCell::new(2, 5), GridCell::new(9, 5), 100_000, 0);
        assert_eq!(result, Err(SearchFailure::Unreachable));
    }

    #[test]
    fn test_expansion_budget() {
        let blocked = table(&[]);
        let result = find_cell_path(&blocked, GridCell::new(0, 0), GridCell::new(19, 19), 5, 0);
        assert!(matches!(result, Err(SearchFailure::Exhausted { .. })));
    }

    #[test]
    fn test_pathfind_same_start_goal() {
        let blocked = table(&[]);
        let path = find_cell_path(&blocked, GridCell::new(4, 4), GridCell::new(4, 4), 10, 0).unwrap();
        assert_eq!(path, vec![GridCell::new(4, 4)]);
    }

    #[test]
    fn test_blocked_goal_is_relocated() {
        let blocked = table(&[Rect::new(100.0, 100.0, 10.0, 10.0)]);
        let goal = GridCell::new(10, 10);
        assert!(blocked.is_blocked(goal));

        assert_eq!(
            find_cell_path(&blocked, GridCell::new(0, 0), goal, 1000, 0),
            Err(SearchFailure::NoOpenCell)
        );
        let path = find_cell_path(&blocked, GridCell::new(0, 0), goal, 1000, 2).unwrap();
        let end = *path.last().unwrap();
        assert!(!blocked.is_blocked(end));
        assert_eq!(end.manhattan(&goal), 1);
    }

    #[test]
    fn test_no_corner_cutting() {
        // Single blocked cell at (5, 5); the direct diagonal from (4, 5) to
        // (5, 4) would clip its corner
        let blocked = table(&[Rect::new(50.0, 50.0, 10.0, 10.0)]);
        let path = find_cell_path(&blocked, GridCell::new(4, 5), GridCell::new(5, 4), 1000, 0).unwrap();
        assert_eq!(path.len(), 3);
    }
}
