//! World state container

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::ai::controller::Brain;
use crate::core::clock::Clock;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, Rect, StorageId, Tick, Vec2, VillagerId};
use crate::entity::needs::DecayRates;
use crate::entity::villager::{Household, Villager, VillagerSnapshot};
use crate::simulation::events::SimulationEvent;
use crate::simulation::tick::run_simulation_tick;
use crate::world::entities::{Entities, EntityKind};
use crate::world::resources::{ResourceCatalog, ResourceType, SeededCatalog};
use crate::world::storage::{Slots, Stack, Storages};
use crate::world::terrain::{Gate, Terrain};

/// Wood in a freshly built fireplace
pub const INITIAL_FIRE_WOOD: f32 = 10.0;

/// Where a villager's household sits relative to its home position
const FIREPLACE_OFFSET: Vec2 = Vec2 { x: 12.0, y: 0.0 };
const BED_OFFSET: Vec2 = Vec2 { x: 0.0, y: 12.0 };
const STORAGE_OFFSET: Vec2 = Vec2 { x: -12.0, y: 0.0 };

/// The game world containing all simulation state
pub struct World {
    pub config: SimulationConfig,
    pub clock: Clock,
    pub terrain: Terrain,
    pub entities: Entities,
    pub storages: Storages,
    /// Updated in array order every tick
    pub villagers: Vec<Villager>,
    pub communal_storage: StorageId,
    pub(crate) catalog: Box<dyn ResourceCatalog>,
    rng: ChaCha8Rng,
    next_villager: u32,
}

/// Serializable world summary
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub day: u64,
    pub hour: f32,
    pub villagers: Vec<VillagerSnapshot>,
    pub communal_storage: Vec<Stack>,
    pub burning_fires: usize,
}

impl World {
    /// Build the static terrain tables and the communal storage. Obstacles
    /// and gates are fixed from here on.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SimulationConfig,
        seed: u64,
        width: f32,
        height: f32,
        obstacles: Vec<Rect>,
        gates: Vec<Gate>,
        communal_position: Vec2,
    ) -> Result<Self> {
        config.validate().map_err(SimError::InvalidConfig)?;
        if width <= 0.0 || height <= 0.0 {
            return Err(SimError::InvalidScenario(format!(
                "World size must be positive, got {width}x{height}"
            )));
        }

        let terrain = Terrain::new(width, height, obstacles, gates, &config.pathfinding);
        let mut storages = Storages::new();
        let communal_storage = storages.spawn(
            communal_position,
            None,
            Slots::new(
                config.collection.communal_storage_capacity,
                config.collection.stack_limit,
            ),
        );

        tracing::info!("World created: {}x{}, seed {}", width, height, seed);
        Ok(Self {
            clock: Clock::new(config.schedule.seconds_per_day),
            config,
            terrain,
            entities: Entities::new(),
            storages,
            villagers: Vec::new(),
            communal_storage,
            catalog: Box::new(SeededCatalog::new(seed)),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_villager: 0,
        })
    }

    pub fn set_catalog(&mut self, catalog: Box<dyn ResourceCatalog>) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &dyn ResourceCatalog {
        self.catalog.as_ref()
    }

    pub fn add_well(&mut self, position: Vec2, water: f32) -> EntityId {
        self.entities.spawn(position, EntityKind::Well { water })
    }

    pub fn add_resource(&mut self, position: Vec2, kind: ResourceType) -> EntityId {
        self.entities.spawn(
            position,
            EntityKind::Resource {
                kind,
                collected: false,
            },
        )
    }

    pub fn add_fireplace(&mut self, position: Vec2, wood: f32) -> EntityId {
        self.entities.spawn(
            position,
            EntityKind::Fireplace {
                wood,
                burning: wood > 0.0,
            },
        )
    }

    pub fn add_sleeping_bag(&mut self, position: Vec2) -> EntityId {
        self.entities
            .spawn(position, EntityKind::SleepingBag { occupant: None })
    }

    pub fn add_storage(&mut self, position: Vec2, owner: Option<VillagerId>, capacity: usize) -> StorageId {
        let slots = Slots::new(capacity, self.config.collection.stack_limit);
        self.storages.spawn(position, owner, slots)
    }

    /// Spawn a villager with its own fireplace, sleeping bag and personal
    /// storage around `home`
    pub fn spawn_villager(&mut self, name: impl Into<String>, home: Vec2) -> VillagerId {
        let id = VillagerId(self.next_villager);
        self.next_villager += 1;

        let household = Household {
            fireplace: self.add_fireplace(home + FIREPLACE_OFFSET, INITIAL_FIRE_WOOD),
            sleeping_bag: self.add_sleeping_bag(home + BED_OFFSET),
            personal_storage: self.add_storage(
                home + STORAGE_OFFSET,
                Some(id),
                self.config.collection.personal_storage_capacity,
            ),
            communal_storage: self.communal_storage,
        };

        let mut villager = Villager::new(id, name, home, household, &self.config);
        let schedule = &self.config.schedule;
        villager.decay = DecayRates::sample(&self.config.needs, &mut self.rng);
        villager.brain = Brain::new(
            self.rng
                .gen_range(schedule.startup_delay_min..=schedule.startup_delay_max),
        );
        let variance = schedule.sleep_variance_hours;
        if variance > 0.0 {
            villager.sleep_offset = self.rng.gen_range(-variance..=variance);
        }

        tracing::info!("Spawned {:?} '{}' at {:?}", id, villager.name, home);
        self.villagers.push(villager);
        id
    }

    pub fn villager(&self, id: VillagerId) -> Option<&Villager> {
        self.villagers.iter().find(|v| v.id == id)
    }

    pub fn villager_mut(&mut self, id: VillagerId) -> Option<&mut Villager> {
        self.villagers.iter_mut().find(|v| v.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.villagers.iter().filter(|v| v.alive).count()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    /// Advance the world by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Result<Vec<SimulationEvent>> {
        run_simulation_tick(self, dt)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let communal_storage = self
            .storages
            .get(self.communal_storage)
            .map(|s| s.slots.stacks().copied().collect())
            .unwrap_or_default();
        let burning_fires = self
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Fireplace { burning: true, .. }))
            .count();
        WorldSnapshot {
            tick: self.clock.current_tick(),
            day: self.clock.current_day(),
            hour: self.clock.hour_of_day(),
            villagers: self.villagers.iter().map(Villager::snapshot).collect(),
            communal_storage,
            burning_fires,
        }
    }
}
