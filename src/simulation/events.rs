//! Observable simulation events emitted during a tick

use serde::{Deserialize, Serialize};

use crate::ai::action::{Action, Task};
use crate::ai::goal::Goal;
use crate::core::types::{EntityId, StorageId, VillagerId};
use crate::entity::needs::NeedType;
use crate::world::resources::ResourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Need(NeedType),
    LethalGate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectSource {
    Ground(EntityId),
    Storage(StorageId),
}

/// Events generated by simulation systems, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    GoalChanged {
        villager: VillagerId,
        from: Option<Goal>,
        to: Goal,
    },
    ActionChanged {
        villager: VillagerId,
        task: Task,
        from: Action,
        to: Action,
    },
    Drank {
        villager: VillagerId,
        well: EntityId,
    },
    Ate {
        villager: VillagerId,
        kind: ResourceType,
    },
    Warmed {
        villager: VillagerId,
        fire: EntityId,
    },
    WoodDeposited {
        villager: VillagerId,
        fire: EntityId,
        kind: ResourceType,
        amount: f32,
    },
    Collected {
        villager: VillagerId,
        kind: ResourceType,
        amount: u32,
        source: CollectSource,
    },
    ItemsStored {
        villager: VillagerId,
        storage: StorageId,
        count: u32,
    },
    FellAsleep {
        villager: VillagerId,
        bag: EntityId,
    },
    WokeUp {
        villager: VillagerId,
    },
    VillagerDied {
        villager: VillagerId,
        cause: DeathCause,
    },
    FireWentOut {
        fire: EntityId,
    },
}

impl SimulationEvent {
    /// Short name used for summary counts
    pub fn name(&self) -> &'static str {
        match self {
            SimulationEvent::GoalChanged { .. } => "goal_changed",
            SimulationEvent::ActionChanged { .. } => "action_changed",
            SimulationEvent::Drank { .. } => "drank",
            SimulationEvent::Ate { .. } => "ate",
            SimulationEvent::Warmed { .. } => "warmed",
            SimulationEvent::WoodDeposited { .. } => "wood_deposited",
            SimulationEvent::Collected { .. } => "collected",
            SimulationEvent::ItemsStored { .. } => "items_stored",
            SimulationEvent::FellAsleep { .. } => "fell_asleep",
            SimulationEvent::WokeUp { .. } => "woke_up",
            SimulationEvent::VillagerDied { .. } => "villager_died",
            SimulationEvent::FireWentOut { .. } => "fire_went_out",
        }
    }
}
