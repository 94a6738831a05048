//! Villager record: needs, inventory, owned references and AI state

use serde::Serialize;

use crate::ai::controller::Brain;
use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, StorageId, Vec2, VillagerId};
use crate::entity::needs::{DecayRates, Needs};
use crate::world::storage::Slots;

#[derive(Debug, Clone)]
pub struct Villager {
    pub id: VillagerId,
    pub name: String,
    pub position: Vec2,
    pub needs: Needs,
    pub decay: DecayRates,
    pub inventory: Slots,
    /// Exclusively owned by this villager
    pub personal_storage: StorageId,
    pub fireplace: EntityId,
    pub sleeping_bag: EntityId,
    /// Shared by everyone
    pub communal_storage: StorageId,
    pub alive: bool,
    pub sleeping: bool,
    pub move_speed: f32,
    /// Hours added to both ends of the configured sleep window
    pub sleep_offset: f32,
    pub brain: Brain,
}

/// Serializable view for run summaries
#[derive(Debug, Clone, Serialize)]
pub struct VillagerSnapshot {
    pub id: VillagerId,
    pub name: String,
    pub alive: bool,
    pub position: Vec2,
    pub needs: Needs,
    pub goal: Option<crate::ai::goal::Goal>,
    pub action: crate::ai::action::Action,
    pub carried: u32,
}

/// Handles to the things a villager owns or shares
#[derive(Debug, Clone, Copy)]
pub struct Household {
    pub personal_storage: StorageId,
    pub fireplace: EntityId,
    pub sleeping_bag: EntityId,
    pub communal_storage: StorageId,
}

impl Villager {
    /// Villager with default needs and config rates; randomized traits are
    /// set by the world at spawn
    pub fn new(
        id: VillagerId,
        name: impl Into<String>,
        position: Vec2,
        household: Household,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            needs: Needs::default(),
            decay: DecayRates::from_config(&config.needs),
            inventory: Slots::new(
                config.collection.inventory_capacity,
                config.collection.stack_limit,
            ),
            personal_storage: household.personal_storage,
            fireplace: household.fireplace,
            sleeping_bag: household.sleeping_bag,
            communal_storage: household.communal_storage,
            alive: true,
            sleeping: false,
            move_speed: config.movement.move_speed,
            sleep_offset: 0.0,
            brain: Brain::new(0.0),
        }
    }

    pub fn snapshot(&self) -> VillagerSnapshot {
        VillagerSnapshot {
            id: self.id,
            name: self.name.clone(),
            alive: self.alive,
            position: self.position,
            needs: self.needs.clone(),
            goal: self.brain.goal,
            action: self.brain.action.action,
            carried: self.inventory.stacks().map(|s| s.count).sum(),
        }
    }
}
