//! Target re-validation and collection policy
//!
//! Targets are captured when found and may be consumed by someone else
//! before the villager arrives. Every tick the manager re-resolves them
//! against live state and drops the stale ones.

use crate::ai::action::{ActionContext, Target};
use crate::core::config::{SimulationConfig, TargetMatching};
use crate::core::error::Result;
use crate::core::types::EntityId;
use crate::entity::villager::Villager;
use crate::world::entities::Entities;
use crate::world::resources::ResourceCategory;
use crate::world::storage::Storages;

pub struct CollectionManager<'a> {
    config: &'a SimulationConfig,
}

impl<'a> CollectionManager<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Live entity a target refers to, if it is still usable
    pub fn resolve_entity(&self, target: &Target, entities: &Entities) -> Option<EntityId> {
        let Target::Entity { id, tag, position } = *target else {
            return None;
        };
        match self.config.collection.target_matching {
            TargetMatching::Identity => entities
                .get(id)
                .filter(|e| e.tag() == tag && e.is_available())
                .map(|e| e.id),
            TargetMatching::Proximity => entities
                .find_near(tag, position, self.config.collection.target_match_tolerance)
                .map(|e| e.id),
        }
    }

    pub fn target_is_valid(
        &self,
        target: &Target,
        entities: &Entities,
        storages: &Storages,
    ) -> Result<bool> {
        match target {
            Target::Entity { .. } => Ok(self.resolve_entity(target, entities).is_some()),
            Target::Storage { id, kind, .. } => {
                let storage = storages.require(*id)?;
                Ok(kind.map_or(true, |k| storage.slots.count(k) > 0))
            }
        }
    }

    /// Drop stale targets and apply the batch/steal policy
    pub fn update(
        &self,
        action: &mut ActionContext,
        emergency: bool,
        entities: &Entities,
        storages: &Storages,
    ) -> Result<()> {
        let before = action.targets.len();
        let mut kept = Vec::with_capacity(before);
        for target in action.targets.drain(..) {
            if self.target_is_valid(&target, entities, storages)? {
                kept.push(target);
            }
        }
        if kept.len() < before {
            action.failed = true;
        }
        action.targets = kept;

        let collection = &self.config.collection;
        if emergency {
            action.batch_size = collection.emergency_batch_size;
            action.may_steal = true;
        } else {
            action.batch_size = collection.normal_batch_size;
            action.may_steal = false;
        }
        Ok(())
    }

    pub fn should_refill_fire(
        &self,
        villager: &Villager,
        emergency: bool,
        entities: &Entities,
    ) -> Result<bool> {
        let wood = entities.fire_wood(villager.fireplace)?;
        let threshold = if emergency {
            self.config.needs.emergency_fire_wood
        } else {
            self.config.needs.regular_fire_wood
        };
        Ok(wood < threshold)
    }

    pub fn should_forage(
        &self,
        villager: &Villager,
        category: ResourceCategory,
        storages: &Storages,
    ) -> Result<bool> {
        if villager.inventory.is_full() {
            return Ok(false);
        }
        let communal = storages.require(villager.communal_storage)?;
        let personal = storages.require(villager.personal_storage)?;
        Ok(communal.slots.can_accept_category(category)
            || personal.slots.can_accept_category(category))
    }

    pub fn should_forage_food(&self, villager: &Villager, storages: &Storages) -> Result<bool> {
        self.should_forage(villager, ResourceCategory::Food, storages)
    }

    pub fn should_forage_burnable(&self, villager: &Villager, storages: &Storages) -> Result<bool> {
        self.should_forage(villager, ResourceCategory::Burnable, storages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{StorageId, Vec2};
    use crate::entity::villager::Household;
    use crate::world::entities::{EntityKind, EntityTag};
    use crate::world::resources::ResourceType;
    use crate::world::storage::Slots;

    struct Fixture {
        config: SimulationConfig,
        entities: Entities,
        storages: Storages,
        villager: Villager,
    }

    fn fixture(config: SimulationConfig) -> Fixture {
        let mut entities = Entities::new();
        let mut storages = Storages::new();
        let fireplace = entities.spawn(
            Vec2::new(50.0, 50.0),
            EntityKind::Fireplace { wood: 2.0, burning: true },
        );
        let sleeping_bag =
            entities.spawn(Vec2::new(60.0, 50.0), EntityKind::SleepingBag { occupant: None });
        let communal_storage = storages.spawn(Vec2::new(0.0, 0.0), None, Slots::new(2, 5));
        let personal_storage = storages.spawn(Vec2::new(40.0, 50.0), None, Slots::new(1, 5));
        let villager = Villager::new(
            crate::core::types::VillagerId(0),
            "Ada",
            Vec2::new(50.0, 60.0),
            Household { personal_storage, fireplace, sleeping_bag, communal_storage },
            &config,
        );
        Fixture { config, entities, storages, villager }
    }

    #[test]
    fn test_consumed_target_is_dropped_and_marks_failed() {
        let mut f = fixture(SimulationConfig::default());
        let berry = f.entities.spawn(
            Vec2::new(100.0, 100.0),
            EntityKind::Resource { kind: ResourceType::Berries, collected: false },
        );
        let mut action = ActionContext::default();
        action.set_target(Target::Entity {
            id: berry,
            tag: EntityTag::Resource(ResourceType::Berries),
            position: Vec2::new(100.0, 100.0),
        });

        let manager = CollectionManager::new(&f.config);
        manager.update(&mut action, false, &f.entities, &f.storages).unwrap();
        assert_eq!(action.targets.len(), 1);
        assert!(!action.failed);

        if let EntityKind::Resource { collected, .. } = &mut f.entities.get_mut(berry).unwrap().kind {
            *collected = true;
        }
        manager.update(&mut action, false, &f.entities, &f.storages).unwrap();
        assert!(action.targets.is_empty());
        assert!(action.failed);
    }

    #[test]
    fn test_proximity_matches_replacement_entity() {
        let mut f = fixture(SimulationConfig::default());
        let well = f.entities.spawn(Vec2::new(10.0, 10.0), EntityKind::Well { water: 5.0 });
        let target = Target::Entity { id: EntityId(999), tag: EntityTag::Well, position: Vec2::new(10.5, 10.0) };

        let manager = CollectionManager::new(&f.config);
        assert_eq!(manager.resolve_entity(&target, &f.entities), Some(well));

        let mut strict = f.config.clone();
        strict.collection.target_matching = TargetMatching::Identity;
        let manager = CollectionManager::new(&strict);
        assert_eq!(manager.resolve_entity(&target, &f.entities), None);
    }

    #[test]
    fn test_emergency_policy() {
        let f = fixture(SimulationConfig::default());
        let manager = CollectionManager::new(&f.config);
        let mut action = ActionContext::default();

        manager.update(&mut action, true, &f.entities, &f.storages).unwrap();
        assert_eq!(action.batch_size, f.config.collection.emergency_batch_size);
        assert!(action.may_steal);

        manager.update(&mut action, false, &f.entities, &f.storages).unwrap();
        assert_eq!(action.batch_size, f.config.collection.normal_batch_size);
        assert!(!action.may_steal);
    }

    #[test]
    fn test_should_refill_fire_uses_matching_threshold() {
        let f = fixture(SimulationConfig::default());
        let manager = CollectionManager::new(&f.config);
        // Wood 2.0: above emergency (1), below regular (3)
        assert!(!manager.should_refill_fire(&f.villager, true, &f.entities).unwrap());
        assert!(manager.should_refill_fire(&f.villager, false, &f.entities).unwrap());
    }

    #[test]
    fn test_should_forage_respects_storage_space() {
        let mut f = fixture(SimulationConfig::default());
        let manager = CollectionManager::new(&f.config);
        assert!(manager.should_forage_food(&f.villager, &f.storages).unwrap());

        let communal = f.villager.communal_storage;
        let personal = f.villager.personal_storage;
        f.storages.get_mut(communal).unwrap().slots.add(ResourceType::Berries, 10);
        f.storages.get_mut(personal).unwrap().slots.add(ResourceType::Apples, 5);
        assert!(!manager.should_forage_food(&f.villager, &f.storages).unwrap());
        assert!(!manager.should_forage_burnable(&f.villager, &f.storages).unwrap());
    }

    #[test]
    fn test_missing_storage_is_an_error() {
        let mut f = fixture(SimulationConfig::default());
        f.villager.communal_storage = StorageId(42);
        let manager = CollectionManager::new(&f.config);
        assert!(manager.should_forage_food(&f.villager, &f.storages).is_err());
    }
}
