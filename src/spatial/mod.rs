//! Spatial indexing for path planning

pub mod blocked;
pub mod grid;
pub mod partition;

pub use blocked::BlockedCellTable;
pub use grid::{Grid, GridCell};
pub use partition::ObstaclePartition;
