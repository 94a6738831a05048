//! World model: terrain, entities, storages, resources and scenarios

pub mod entities;
pub mod resources;
pub mod scenario;
pub mod state;
pub mod storage;
pub mod terrain;

pub use entities::{Entities, Entity, EntityKind, EntityTag};
pub use resources::{Nutrition, ResourceCatalog, ResourceCategory, ResourceType, SeededCatalog};
pub use scenario::ScenarioFile;
pub use state::{World, WorldSnapshot};
pub use storage::{Slots, Stack, Storage, Storages};
pub use terrain::{Gate, Terrain};
