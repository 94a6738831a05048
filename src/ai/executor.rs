//! Per-state work for the action machine
//!
//! Each `execute_*` function performs one tick of its action state and
//! reports what it observed as `Facts`; the transition table decides what
//! happens next. Terminal interactions only happen within interaction
//! distance; otherwise the villager walks there through the pathfinder.

use crate::ai::action::{Facts, Target, Task};
use crate::ai::collection::CollectionManager;
use crate::ai::targeting::{
    entity_target, find_nearest_burnable_anywhere, find_nearest_burning_fire, find_nearest_food,
    find_nearest_forage, find_nearest_well_with_water, find_own_sleeping_bag_or_nearest_if_busy,
    ForageFilter,
};
use crate::ai::AiContext;
use crate::core::error::Result;
use crate::core::types::{EntityId, StorageId, Vec2};
use crate::entity::needs::NeedType;
use crate::entity::villager::Villager;
use crate::pathfinding::MoveStatus;
use crate::simulation::events::{CollectSource, SimulationEvent};
use crate::world::entities::{Entities, EntityKind};
use crate::world::resources::{ResourceCategory, ResourceType};
use crate::world::storage::{Slots, Storages};

/// Facts every state shares
pub fn base_facts(villager: &Villager, task: Task) -> Facts {
    let holds_needed_item = task.needs_immediate_use()
        && task
            .needed_category()
            .is_some_and(|c| villager.inventory.holds_category(c));
    Facts {
        holds_needed_item,
        targets_empty: villager.brain.action.targets.is_empty(),
        ..Facts::default()
    }
}

/// Walk towards `target`; true once within interaction distance.
///
/// After the path runs out the villager closes the last few units directly,
/// unless that step would hit an obstacle or enter a lethal gate. A target
/// tucked against a wall has its goal cell moved off the wall, so standing at
/// the end of the path within one extra cell of it also counts as reached.
pub fn approach(villager: &mut Villager, target: Vec2, ctx: &AiContext) -> bool {
    let reach = ctx.config.collection.interaction_distance;
    if villager.position.distance(&target) <= reach {
        return true;
    }

    let status = villager.brain.navigator.move_towards(
        &mut villager.position,
        target,
        villager.move_speed,
        ctx.dt,
        ctx.pathfinder,
        &ctx.config.movement,
        ctx.now,
    );
    if status == MoveStatus::PathComplete && villager.position.distance(&target) > reach {
        let next = villager.position.step_towards(target, villager.move_speed * ctx.dt);
        let clearance = ctx.config.pathfinding.obstacle_margin;
        if ctx.terrain.lethal_gate_at(next) || ctx.terrain.partition.any_within(next, clearance) {
            let slack = reach + ctx.config.pathfinding.cell_size;
            if villager.position.distance(&target) <= slack {
                return true;
            }
            villager.brain.action.failed = true;
            return false;
        }
        villager.position = next;
    }

    villager.position.distance(&target) <= reach
}

/// Current target, or the finder's pick which then becomes the target
fn ensure_target(
    villager: &mut Villager,
    find: impl FnOnce(&Villager) -> Option<Target>,
) -> Option<Target> {
    if let Some(target) = villager.brain.action.target() {
        return Some(*target);
    }
    let target = find(villager)?;
    villager.brain.action.set_target(target);
    Some(target)
}

fn give_up(villager: &mut Villager, facts: &mut Facts) {
    villager.brain.action.targets.clear();
    villager.brain.action.failed = true;
    facts.targets_empty = true;
}

pub fn own_fire_target(villager: &Villager, entities: &Entities) -> Result<Target> {
    Ok(entity_target(entities.require(villager.fireplace)?))
}

pub fn execute_find(villager: &mut Villager, task: Task, ctx: &mut AiContext) -> Facts {
    let mut facts = base_facts(villager, task);
    let filter = ForageFilter::build(ctx.entities, &ctx.config.forage, ctx.catalog);
    let may_steal = villager.brain.action.may_steal;

    let found = match task {
        Task::Eat => find_nearest_food(villager, may_steal, ctx.entities, ctx.storages, &filter),
        Task::FireRefill => {
            find_nearest_burnable_anywhere(villager, may_steal, ctx.entities, ctx.storages, &filter)
        }
        Task::ForageFood => {
            find_nearest_forage(villager, ResourceCategory::Food, ctx.entities, &filter)
        }
        Task::ForageBurnable => {
            find_nearest_forage(villager, ResourceCategory::Burnable, ctx.entities, &filter)
        }
        Task::Drink => find_nearest_well_with_water(villager.position, ctx.entities),
        Task::Warmup => find_nearest_burning_fire(villager.position, ctx.entities),
        Task::Sleep => find_own_sleeping_bag_or_nearest_if_busy(villager, ctx.entities),
        Task::StoreItems => None,
    };

    if let Some(target) = found {
        villager.brain.action.set_target(target);
        villager.brain.action.failed = false;
        facts.target_found = true;
        facts.targets_empty = false;
    }
    facts
}

pub fn execute_move(villager: &mut Villager, task: Task, ctx: &mut AiContext) -> Facts {
    let mut facts = base_facts(villager, task);
    if facts.holds_needed_item {
        return facts;
    }
    let Some(target) = villager.brain.action.target().copied() else {
        return facts;
    };
    facts.within_reach = approach(villager, target.position(), ctx);
    facts
}

pub fn execute_collect(villager: &mut Villager, task: Task, ctx: &mut AiContext) -> Result<Facts> {
    let mut facts = base_facts(villager, task);
    let Some(target) = villager.brain.action.target().copied() else {
        return Ok(facts);
    };
    let step = ctx.dt / ctx.config.collection.collect_duration.max(f32::EPSILON);
    if !villager.brain.action.advance_progress(step) {
        return Ok(facts);
    }

    let collected = match target {
        Target::Entity { .. } => {
            let manager = CollectionManager::new(ctx.config);
            match manager.resolve_entity(&target, ctx.entities) {
                Some(id) => pick_up(villager, ctx.entities, id)?
                    .map(|kind| (kind, 1, CollectSource::Ground(id))),
                None => None,
            }
        }
        Target::Storage { id, kind: Some(kind), .. } => {
            let batch = villager.brain.action.batch_size;
            let storage = ctx.storages.require_mut(id)?;
            let taken = storage.slots.take(kind, batch);
            let added = villager.inventory.add(kind, taken);
            if added < taken {
                storage.slots.add(kind, taken - added);
            }
            (added > 0).then_some((kind, added, CollectSource::Storage(id)))
        }
        Target::Storage { kind: None, .. } => None,
    };

    match collected {
        Some((kind, amount, source)) => {
            tracing::debug!("{:?} collected {} x {:?} from {:?}", villager.id, amount, kind, source);
            ctx.events.push(SimulationEvent::Collected {
                villager: villager.id,
                kind,
                amount,
                source,
            });
            facts.progress_done = true;
        }
        None => give_up(villager, &mut facts),
    }
    Ok(facts)
}

/// Moves one ground resource into the inventory if there is room
fn pick_up(
    villager: &mut Villager,
    entities: &mut Entities,
    id: EntityId,
) -> Result<Option<ResourceType>> {
    let EntityKind::Resource { kind, collected } = &mut entities.require_mut(id)?.kind else {
        return Ok(None);
    };
    if *collected || villager.inventory.add(*kind, 1) == 0 {
        return Ok(None);
    }
    *collected = true;
    Ok(Some(*kind))
}

/// Communal storage if it takes any carried item, else the personal one
fn choose_storage(villager: &Villager, storages: &Storages) -> Result<Option<StorageId>> {
    let accepts = |slots: &Slots| villager.inventory.stacks().any(|s| slots.can_accept(s.kind));
    for id in [villager.communal_storage, villager.personal_storage] {
        if accepts(&storages.require(id)?.slots) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

pub fn execute_store(villager: &mut Villager, task: Task, ctx: &mut AiContext) -> Result<Facts> {
    let mut facts = base_facts(villager, task);
    // Nothing to store, or nowhere to put it: hold until the task changes
    if villager.inventory.is_empty() {
        return Ok(facts);
    }
    let Some(id) = choose_storage(villager, ctx.storages)? else {
        villager.brain.action.failed = true;
        return Ok(facts);
    };

    let position = ctx.storages.require(id)?.position;
    villager.brain.action.set_target(Target::Storage { id, kind: None, position });
    facts.targets_empty = false;
    if !approach(villager, position, ctx) {
        return Ok(facts);
    }
    facts.within_reach = true;

    let step = ctx.dt / ctx.config.collection.store_duration.max(f32::EPSILON);
    if !villager.brain.action.advance_progress(step) {
        return Ok(facts);
    }

    let storage = ctx.storages.require_mut(id)?;
    let count = villager.inventory.transfer_into(&mut storage.slots);
    tracing::debug!("{:?} stored {} items in {:?}", villager.id, count, id);
    ctx.events.push(SimulationEvent::ItemsStored {
        villager: villager.id,
        storage: id,
        count,
    });
    facts.progress_done = true;
    Ok(facts)
}

pub fn execute_use_facility(
    villager: &mut Villager,
    task: Task,
    ctx: &mut AiContext,
) -> Result<Facts> {
    let mut facts = base_facts(villager, task);
    match task {
        Task::Drink => drink(villager, ctx, &mut facts)?,
        Task::Warmup => warm_up(villager, ctx, &mut facts)?,
        Task::Eat => eat(villager, ctx, &mut facts)?,
        Task::FireRefill => refill_fire(villager, ctx, &mut facts)?,
        _ => facts.interacted = true,
    }
    Ok(facts)
}

fn drink(villager: &mut Villager, ctx: &mut AiContext, facts: &mut Facts) -> Result<()> {
    let entities = &*ctx.entities;
    let Some(target) = ensure_target(villager, |v| find_nearest_well_with_water(v.position, entities))
    else {
        villager.brain.action.failed = true;
        return Ok(());
    };
    if !approach(villager, target.position(), ctx) {
        return Ok(());
    }

    let manager = CollectionManager::new(ctx.config);
    let Some(well) = manager.resolve_entity(&target, ctx.entities) else {
        give_up(villager, facts);
        return Ok(());
    };
    if let EntityKind::Well { water } = &mut ctx.entities.require_mut(well)?.kind {
        *water -= 1.0;
    }
    villager.needs.restore(NeedType::Water, ctx.config.needs.drink_restore);
    ctx.events.push(SimulationEvent::Drank {
        villager: villager.id,
        well,
    });
    facts.interacted = true;
    Ok(())
}

fn warm_up(villager: &mut Villager, ctx: &mut AiContext, facts: &mut Facts) -> Result<()> {
    let entities = &*ctx.entities;
    let Some(target) = ensure_target(villager, |v| find_nearest_burning_fire(v.position, entities))
    else {
        villager.brain.action.failed = true;
        return Ok(());
    };
    if !approach(villager, target.position(), ctx) {
        return Ok(());
    }

    let manager = CollectionManager::new(ctx.config);
    let fire = match manager.resolve_entity(&target, ctx.entities) {
        Some(id) if ctx.entities.fire_wood(id)? > 0.0 => id,
        _ => {
            give_up(villager, facts);
            return Ok(());
        }
    };
    villager.needs.restore(NeedType::Temperature, ctx.config.needs.warmup_restore);
    ctx.events.push(SimulationEvent::Warmed {
        villager: villager.id,
        fire,
    });
    facts.interacted = true;
    Ok(())
}

/// Nearer of the villager's own fire and the nearest burning one
fn eating_spot(villager: &Villager, entities: &Entities) -> Result<Target> {
    let own = own_fire_target(villager, entities)?;
    let best = match find_nearest_burning_fire(villager.position, entities) {
        Some(other)
            if other.position().distance(&villager.position)
                < own.position().distance(&villager.position) =>
        {
            other
        }
        _ => own,
    };
    Ok(best)
}

fn eat(villager: &mut Villager, ctx: &mut AiContext, facts: &mut Facts) -> Result<()> {
    let Some(kind) = villager.inventory.first_of_category(ResourceCategory::Food) else {
        villager.brain.action.failed = true;
        facts.interacted = true;
        return Ok(());
    };
    if villager.brain.action.targets.is_empty() {
        let spot = eating_spot(villager, ctx.entities)?;
        villager.brain.action.set_target(spot);
    }
    let Some(target) = villager.brain.action.target().copied() else {
        return Ok(());
    };
    if !approach(villager, target.position(), ctx) {
        return Ok(());
    }

    villager.inventory.take(kind, 1);
    let nutrition = ctx.catalog.nutrition(kind);
    villager.needs.apply_nutrition(&nutrition);
    if nutrition.poisonous {
        tracing::debug!("{:?} ate poisonous {:?}", villager.id, kind);
    }
    ctx.events.push(SimulationEvent::Ate {
        villager: villager.id,
        kind,
    });
    facts.interacted = true;
    Ok(())
}

fn refill_fire(villager: &mut Villager, ctx: &mut AiContext, facts: &mut Facts) -> Result<()> {
    let Some(kind) = villager.inventory.first_of_category(ResourceCategory::Burnable) else {
        villager.brain.action.failed = true;
        facts.interacted = true;
        return Ok(());
    };
    let own = own_fire_target(villager, ctx.entities)?;
    if villager.brain.action.target() != Some(&own) {
        villager.brain.action.set_target(own);
    }
    if !approach(villager, own.position(), ctx) {
        return Ok(());
    }

    let amount = ctx.catalog.nutrition(kind).fire_value;
    villager.inventory.take(kind, 1);
    if let EntityKind::Fireplace { wood, burning } =
        &mut ctx.entities.require_mut(villager.fireplace)?.kind
    {
        *wood += amount;
        *burning = true;
    }
    ctx.events.push(SimulationEvent::WoodDeposited {
        villager: villager.id,
        fire: villager.fireplace,
        kind,
        amount,
    });
    facts.interacted = true;
    Ok(())
}

/// Walk to a bed and occupy it; stays asleep until the goal changes
pub fn execute_sleep(villager: &mut Villager, ctx: &mut AiContext) -> Result<Facts> {
    let mut facts = base_facts(villager, Task::Sleep);
    if villager.sleeping {
        return Ok(facts);
    }
    let entities = &*ctx.entities;
    let Some(target) =
        ensure_target(villager, |v| find_own_sleeping_bag_or_nearest_if_busy(v, entities))
    else {
        villager.brain.action.failed = true;
        return Ok(facts);
    };
    if !approach(villager, target.position(), ctx) {
        return Ok(facts);
    }
    let Target::Entity { id, .. } = target else {
        return Ok(facts);
    };

    if let EntityKind::SleepingBag { occupant } = &mut ctx.entities.require_mut(id)?.kind {
        match occupant {
            Some(other) if *other != villager.id => {
                // Taken while we walked over
                give_up(villager, &mut facts);
                return Ok(facts);
            }
            _ => *occupant = Some(villager.id),
        }
    }
    villager.sleeping = true;
    ctx.events.push(SimulationEvent::FellAsleep {
        villager: villager.id,
        bag: id,
    });
    facts.interacted = true;
    Ok(facts)
}

/// Free any bag the villager occupies. Returns true if it was asleep.
pub fn release_sleeping_bag(villager: &mut Villager, entities: &mut Entities) -> bool {
    for entity in entities.iter_mut() {
        if let EntityKind::SleepingBag { occupant } = &mut entity.kind {
            if *occupant == Some(villager.id) {
                *occupant = None;
            }
        }
    }
    std::mem::replace(&mut villager.sleeping, false)
}
