//! World step: fires, need decay, villager AI, deaths

use crate::ai::controller;
use crate::ai::executor::release_sleeping_bag;
use crate::ai::AiContext;
use crate::core::error::Result;
use crate::entity::villager::Villager;
use crate::pathfinding::Pathfinder;
use crate::simulation::events::{DeathCause, SimulationEvent};
use crate::world::entities::{Entities, EntityKind};
use crate::world::state::World;

/// Run a single simulation tick of `dt` seconds.
///
/// Villagers update in array order, so earlier villagers win any race for
/// shared resources. Dead villagers are removed at the end of the tick.
pub fn run_simulation_tick(world: &mut World, dt: f32) -> Result<Vec<SimulationEvent>> {
    let mut events = Vec::new();

    world.clock.advance(dt);
    let minutes = dt * world.config.minutes_per_second();
    burn_fires(
        &mut world.entities,
        minutes * world.config.needs.fire_burn_per_minute,
        &mut events,
    );

    let World {
        config,
        clock,
        terrain,
        entities,
        storages,
        villagers,
        catalog,
        ..
    } = world;
    let config = &*config;
    let pathfinder = Pathfinder::new(&terrain.blocked, &config.pathfinding);
    let mut ctx = AiContext {
        entities,
        storages,
        terrain: &*terrain,
        pathfinder: &pathfinder,
        catalog: catalog.as_ref(),
        config,
        now: clock.now(),
        hour: clock.hour_of_day(),
        dt,
        events: &mut events,
    };

    for villager in villagers.iter_mut() {
        if !villager.alive {
            continue;
        }

        let multiplier = if villager.sleeping {
            config.needs.sleep_decay_multiplier
        } else {
            1.0
        };
        villager.needs.decay(minutes, &villager.decay, multiplier);
        if let Some(need) = villager.needs.depleted() {
            kill(villager, DeathCause::Need(need), &mut ctx);
            continue;
        }

        controller::update(villager, &mut ctx)?;

        if ctx.terrain.lethal_gate_at(villager.position) {
            kill(villager, DeathCause::LethalGate, &mut ctx);
        }
    }

    for i in (0..villagers.len()).rev() {
        if !villagers[i].alive {
            villagers.remove(i);
        }
    }

    Ok(events)
}

fn burn_fires(entities: &mut Entities, burn: f32, events: &mut Vec<SimulationEvent>) {
    for entity in entities.iter_mut() {
        if let EntityKind::Fireplace { wood, burning } = &mut entity.kind {
            if !*burning {
                continue;
            }
            *wood = (*wood - burn).max(0.0);
            if *wood <= 0.0 {
                *burning = false;
                events.push(SimulationEvent::FireWentOut { fire: entity.id });
            }
        }
    }
}

fn kill(villager: &mut Villager, cause: DeathCause, ctx: &mut AiContext) {
    villager.alive = false;
    release_sleeping_bag(villager, ctx.entities);
    tracing::info!("{:?} '{}' died: {:?}", villager.id, villager.name, cause);
    ctx.events.push(SimulationEvent::VillagerDied {
        villager: villager.id,
        cause,
    });
}
