//! Target finders for the action executor
//!
//! Every finder returns the single nearest eligible candidate by Euclidean
//! distance from the villager, or `None`.

use ahash::AHashMap;

use crate::ai::action::Target;
use crate::core::config::ForageConfig;
use crate::core::types::{StorageId, Vec2};
use crate::entity::villager::Villager;
use crate::world::entities::{Entities, Entity, EntityKind};
use crate::world::resources::{ResourceCatalog, ResourceCategory, ResourceType};
use crate::world::storage::Storages;

pub fn entity_target(entity: &Entity) -> Target {
    Target::Entity {
        id: entity.id,
        tag: entity.tag(),
        position: entity.position,
    }
}

fn nearest<'e>(from: Vec2, candidates: impl Iterator<Item = &'e Entity>) -> Option<&'e Entity> {
    candidates.min_by(|a, b| a.position.distance(&from).total_cmp(&b.position.distance(&from)))
}

pub fn find_nearest_well_with_water(from: Vec2, entities: &Entities) -> Option<Target> {
    nearest(
        from,
        entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Well { water } if water >= 1.0)),
    )
    .map(entity_target)
}

pub fn find_nearest_burning_fire(from: Vec2, entities: &Entities) -> Option<Target> {
    nearest(
        from,
        entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Fireplace { wood, .. } if wood > 0.0)),
    )
    .map(entity_target)
}

/// The villager's own bag unless someone else is in it, then the nearest
/// free bag
pub fn find_own_sleeping_bag_or_nearest_if_busy(
    villager: &Villager,
    entities: &Entities,
) -> Option<Target> {
    let usable = |e: &Entity| match e.kind {
        EntityKind::SleepingBag { occupant } => occupant.map_or(true, |v| v == villager.id),
        _ => false,
    };

    if let Some(own) = entities.get(villager.sleeping_bag) {
        if usable(own) {
            return Some(entity_target(own));
        }
    }
    nearest(villager.position, entities.iter().filter(|e| usable(e))).map(entity_target)
}

/// Golden rule for ground resources: leave risky or scarce items alone
pub struct ForageFilter<'a> {
    config: &'a ForageConfig,
    catalog: &'a dyn ResourceCatalog,
    counts: AHashMap<(ResourceType, i32, i32), u32>,
}

impl<'a> ForageFilter<'a> {
    pub fn build(
        entities: &Entities,
        config: &'a ForageConfig,
        catalog: &'a dyn ResourceCatalog,
    ) -> Self {
        let mut counts = AHashMap::new();
        for (entity, kind) in entities.uncollected_resources() {
            let (cx, cy) = forage_cell(entity.position, config.cell_size);
            *counts.entry((kind, cx, cy)).or_insert(0) += 1;
        }
        Self {
            config,
            catalog,
            counts,
        }
    }

    /// Uncollected entities of `kind` sharing the coarse cell of `position`
    pub fn local_count(&self, kind: ResourceType, position: Vec2) -> u32 {
        let (cx, cy) = forage_cell(position, self.config.cell_size);
        self.counts.get(&(kind, cx, cy)).copied().unwrap_or(0)
    }

    pub fn accepts(&self, entity: &Entity, forager_speed: f32) -> bool {
        let EntityKind::Resource { kind, collected } = entity.kind else {
            return false;
        };
        if collected {
            return false;
        }
        if self.config.avoid_poisonous && self.catalog.nutrition(kind).poisonous {
            return false;
        }
        if self.config.avoid_fast_animals
            && kind.is_animal()
            && self.catalog.run_speed(kind) > forager_speed
        {
            return false;
        }
        self.local_count(kind, entity.position) >= self.config.min_count
    }
}

fn forage_cell(position: Vec2, cell_size: f32) -> (i32, i32) {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
    )
}

/// Ground resources of `category` that pass the golden rule
pub fn find_nearest_forage(
    villager: &Villager,
    category: ResourceCategory,
    entities: &Entities,
    filter: &ForageFilter,
) -> Option<Target> {
    nearest(
        villager.position,
        entities.iter().filter(|e| match e.kind {
            EntityKind::Resource { kind, .. } => {
                kind.category() == category && filter.accepts(e, villager.move_speed)
            }
            _ => false,
        }),
    )
    .map(entity_target)
}

/// Storages the villager may take from: its own, the communal one, and
/// everyone else's when stealing is allowed
fn storage_candidates<'s>(
    villager: &'s Villager,
    storages: &'s Storages,
    may_steal: bool,
) -> impl Iterator<Item = StorageId> + 's {
    storages.iter().map(|s| s.id).filter(move |&id| {
        may_steal || id == villager.personal_storage || id == villager.communal_storage
    })
}

/// Nearest source of `category` among storages and ground resources; both
/// compete purely on distance
pub fn find_nearest_in_category(
    villager: &Villager,
    category: ResourceCategory,
    may_steal: bool,
    entities: &Entities,
    storages: &Storages,
    filter: &ForageFilter,
) -> Option<Target> {
    let from = villager.position;
    let mut best: Option<(f32, Target)> = None;
    let mut consider = |distance: f32, target: Target| {
        if best.as_ref().map_or(true, |(d, _)| distance < *d) {
            best = Some((distance, target));
        }
    };

    for id in storage_candidates(villager, storages, may_steal) {
        let Some(storage) = storages.get(id) else {
            continue;
        };
        if let Some(kind) = storage.slots.first_of_category(category) {
            consider(
                storage.position.distance(&from),
                Target::Storage {
                    id,
                    kind: Some(kind),
                    position: storage.position,
                },
            );
        }
    }

    if let Some(ground) = find_nearest_forage(villager, category, entities, filter) {
        consider(ground.position().distance(&from), ground);
    }

    best.map(|(_, target)| target)
}

pub fn find_nearest_food(
    villager: &Villager,
    may_steal: bool,
    entities: &Entities,
    storages: &Storages,
    filter: &ForageFilter,
) -> Option<Target> {
    find_nearest_in_category(villager, ResourceCategory::Food, may_steal, entities, storages, filter)
}

pub fn find_nearest_burnable_anywhere(
    villager: &Villager,
    may_steal: bool,
    entities: &Entities,
    storages: &Storages,
    filter: &ForageFilter,
) -> Option<Target> {
    find_nearest_in_category(
        villager,
        ResourceCategory::Burnable,
        may_steal,
        entities,
        storages,
        filter,
    )
}
