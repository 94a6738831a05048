//! Goal arbitration: the top tier of villager behavior
//!
//! Predicates are checked in a fixed order and the first one that holds
//! wins, so a higher-priority goal always beats a lower one.

use serde::{Deserialize, Serialize};

use crate::core::clock::hour_in_window;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::entity::villager::Villager;
use crate::world::entities::Entities;
use crate::world::storage::Storages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    Survive,
    Rest,
    Maintain,
    Contribute,
}

/// One set of need cutoffs (emergency or regular)
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub water: f32,
    pub calories: f32,
    pub temperature: f32,
    pub fire_wood: f32,
}

impl Thresholds {
    pub fn emergency(config: &SimulationConfig) -> Self {
        let n = &config.needs;
        Self {
            water: n.emergency_water,
            calories: n.emergency_calories,
            temperature: n.emergency_temperature,
            fire_wood: n.emergency_fire_wood,
        }
    }

    pub fn regular(config: &SimulationConfig) -> Self {
        let n = &config.needs;
        Self {
            water: n.regular_water,
            calories: n.regular_calories,
            temperature: n.regular_temperature,
            fire_wood: n.regular_fire_wood,
        }
    }

    /// True if any need (or the villager's own fire) is below these cutoffs
    pub fn breached(&self, villager: &Villager, own_fire_wood: f32) -> bool {
        villager.needs.water < self.water
            || villager.needs.calories < self.calories
            || villager.needs.temperature < self.temperature
            || own_fire_wood < self.fire_wood
    }
}

pub struct GoalEvaluator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> GoalEvaluator<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    pub fn in_sleep_window(&self, villager: &Villager, hour: f32) -> bool {
        let s = &self.config.schedule;
        hour_in_window(
            hour,
            s.sleep_start_hour + villager.sleep_offset,
            s.sleep_end_hour + villager.sleep_offset,
        )
    }

    /// Pick the goal for this tick. Fails only on broken references.
    pub fn evaluate(
        &self,
        villager: &Villager,
        hour: f32,
        entities: &Entities,
        storages: &Storages,
    ) -> Result<Goal> {
        let own_fire = entities.fire_wood(villager.fireplace)?;

        if Thresholds::emergency(self.config).breached(villager, own_fire) {
            return Ok(Goal::Survive);
        }
        if self.in_sleep_window(villager, hour) {
            return Ok(Goal::Rest);
        }
        if Thresholds::regular(self.config).breached(villager, own_fire) {
            return Ok(Goal::Maintain);
        }

        let personal = storages.require(villager.personal_storage)?;
        let communal = storages.require(villager.communal_storage)?;
        let all_full =
            villager.inventory.is_full() && personal.slots.is_full() && communal.slots.is_full();
        if !all_full {
            return Ok(Goal::Contribute);
        }

        Ok(Goal::Maintain)
    }
}
