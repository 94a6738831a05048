//! Static walls and gates supplied at world creation

use serde::{Deserialize, Serialize};

use crate::core::config::PathfindingConfig;
use crate::core::types::{Rect, Vec2};
use crate::spatial::blocked::BlockedCellTable;
use crate::spatial::partition::ObstaclePartition;

/// Rectangular zone; lethal gates kill on contact and are impassable for planning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(rename = "is_lethal")]
    pub lethal: bool,
}

impl Gate {
    pub fn new(rect: Rect, lethal: bool) -> Self {
        Self { rect, lethal }
    }
}

/// Everything static about the world, with the derived planning tables
pub struct Terrain {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<Rect>,
    pub gates: Vec<Gate>,
    pub partition: ObstaclePartition,
    pub blocked: BlockedCellTable,
}

impl Terrain {
    /// Builds the partition and blocked-cell table; call only once all
    /// obstacles and gates are known
    pub fn new(
        width: f32,
        height: f32,
        obstacles: Vec<Rect>,
        gates: Vec<Gate>,
        config: &PathfindingConfig,
    ) -> Self {
        let partition = ObstaclePartition::build(&obstacles, config.partition_cell_size);
        let blocked = BlockedCellTable::build(width, height, config, &partition, &gates);
        tracing::debug!(
            "Terrain built: {} obstacles, {} gates, {}/{} cells blocked",
            obstacles.len(),
            gates.len(),
            blocked.blocked_count(),
            blocked.cell_count()
        );
        Self {
            width,
            height,
            obstacles,
            gates,
            partition,
            blocked,
        }
    }

    /// Direct-movement collision test against lethal gates
    pub fn lethal_gate_at(&self, pos: Vec2) -> bool {
        self.gates.iter().any(|g| g.lethal && g.rect.contains(pos))
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.width && pos.y <= self.height
    }
}
