//! Simulation configuration with documented constants
//!
//! Every threshold the AI and planner consult lives here. A single
//! `SimulationConfig` is loaded once before the simulation starts and is
//! passed by reference into every component; nothing reads global state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Top-level configuration, one section per subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub needs: NeedConfig,
    pub schedule: ScheduleConfig,
    pub collection: CollectionConfig,
    pub forage: ForageConfig,
    pub pathfinding: PathfindingConfig,
    pub movement: MovementConfig,
}

/// Need thresholds, decay and restoration amounts. Needs live on `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedConfig {
    // === EMERGENCY THRESHOLDS (Survive goal) ===
    pub emergency_water: f32,
    pub emergency_calories: f32,
    pub emergency_temperature: f32,
    /// Own fireplace wood below this is a survival problem
    pub emergency_fire_wood: f32,

    // === REGULAR THRESHOLDS (Maintain goal) ===
    pub regular_water: f32,
    pub regular_calories: f32,
    pub regular_temperature: f32,
    pub regular_fire_wood: f32,

    // === DECAY (per simulated minute) ===
    pub temperature_decay: f32,
    pub water_decay: f32,
    pub calories_decay: f32,
    pub vitamin_decay: f32,
    /// Fractional spread applied to each decay rate once at spawn.
    ///
    /// At 0.2 a villager's water decay lands somewhere in `[0.8, 1.2]`
    /// times the base rate for its whole life.
    pub daily_variance: f32,
    /// Decay multiplier while asleep in a sleeping bag
    pub sleep_decay_multiplier: f32,

    // === RESTORATION ===
    pub drink_restore: f32,
    pub warmup_restore: f32,
    /// Wood a fireplace burns per simulated minute
    pub fire_burn_per_minute: f32,
}

impl Default for NeedConfig {
    fn default() -> Self {
        Self {
            emergency_water: 20.0,
            emergency_calories: 20.0,
            emergency_temperature: 20.0,
            emergency_fire_wood: 1.0,

            regular_water: 50.0,
            regular_calories: 50.0,
            regular_temperature: 50.0,
            regular_fire_wood: 3.0,

            temperature_decay: 0.08,
            water_decay: 0.1,
            calories_decay: 0.07,
            vitamin_decay: 0.03,
            daily_variance: 0.2,
            sleep_decay_multiplier: 0.5,

            drink_restore: 40.0,
            warmup_restore: 35.0,
            fire_burn_per_minute: 0.01,
        }
    }
}

/// Day length, sleep window and agent start staggering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Real seconds of `dt` per simulated day
    pub seconds_per_day: f32,
    /// Start of the sleep window, hour of day in `[0, 24)`
    pub sleep_start_hour: f32,
    /// End of the sleep window; may be smaller than the start (wraps midnight)
    pub sleep_end_hour: f32,
    /// Per-villager random offset applied to the sleep window, in hours
    pub sleep_variance_hours: f32,
    /// Startup delay range in seconds; staggers agents so they do not herd
    pub startup_delay_min: f32,
    pub startup_delay_max: f32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 600.0,
            sleep_start_hour: 22.0,
            sleep_end_hour: 6.0,
            sleep_variance_hours: 0.0,
            startup_delay_min: 0.0,
            startup_delay_max: 2.0,
        }
    }
}

/// How action targets are re-validated each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMatching {
    /// Same type within `target_match_tolerance` of the remembered position
    Proximity,
    /// Same stable entity id
    Identity,
}

/// Inventory, batch and interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub normal_batch_size: u32,
    pub emergency_batch_size: u32,
    pub inventory_capacity: usize,
    pub personal_storage_capacity: usize,
    pub communal_storage_capacity: usize,
    /// Maximum units in one slot stack
    pub stack_limit: u32,
    /// Seconds to finish a collect action
    pub collect_duration: f32,
    /// Seconds to finish a store action
    pub store_duration: f32,
    /// Distance at which a villager can interact with a target
    pub interaction_distance: f32,
    pub target_match_tolerance: f32,
    pub target_matching: TargetMatching,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            normal_batch_size: 5,
            emergency_batch_size: 1,
            inventory_capacity: 6,
            personal_storage_capacity: 8,
            communal_storage_capacity: 24,
            stack_limit: 5,
            collect_duration: 1.5,
            store_duration: 1.0,
            interaction_distance: 16.0,
            target_match_tolerance: 1.0,
            target_matching: TargetMatching::Proximity,
        }
    }
}

/// Golden-rule forage filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForageConfig {
    /// Minimum same-kind uncollected count in the candidate's coarse cell
    pub min_count: u32,
    /// Coarse cell size used for the population count
    pub cell_size: f32,
    pub avoid_poisonous: bool,
    pub avoid_fast_animals: bool,
}

impl Default for ForageConfig {
    fn default() -> Self {
        Self {
            min_count: 2,
            cell_size: 100.0,
            avoid_poisonous: true,
            avoid_fast_animals: true,
        }
    }
}

/// Grid, blocked-cell and A* search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Edge length of a planning cell (world units)
    pub cell_size: f32,
    /// Extra clearance around obstacles when marking cells blocked
    pub obstacle_margin: f32,
    /// Bucket size of the obstacle spatial partition
    pub partition_cell_size: f32,
    /// Node expansions before a search gives up
    pub max_expansions: usize,
    /// Minimum seconds between searches for one agent
    pub replan_interval: f32,
    /// Ring radius (cells) searched when a start or goal cell is blocked
    pub relocate_radius: i32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            cell_size: 20.0,
            obstacle_margin: 4.0,
            partition_cell_size: 100.0,
            max_expansions: 4000,
            replan_interval: 0.5,
            relocate_radius: 3,
        }
    }
}

/// Waypoint following
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Base speed in world units per second
    pub move_speed: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
    /// Seconds without reaching a waypoint before snapping onto it
    pub stuck_timeout: f32,
    /// Replan once the live target moves this far from the planned destination
    pub target_drift_tolerance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 40.0,
            arrival_radius: 4.0,
            stuck_timeout: 2.0,
            target_drift_tolerance: 20.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file; missing keys fall back to defaults
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(SimError::InvalidConfig)?;
        Ok(config)
    }

    /// Simulated minutes that pass per real second of `dt`
    pub fn minutes_per_second(&self) -> f32 {
        (24.0 * 60.0) / self.schedule.seconds_per_day
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = &self.needs;
        let pairs = [
            ("water", n.emergency_water, n.regular_water),
            ("calories", n.emergency_calories, n.regular_calories),
            ("temperature", n.emergency_temperature, n.regular_temperature),
            ("fire_wood", n.emergency_fire_wood, n.regular_fire_wood),
        ];
        for (name, emergency, regular) in pairs {
            if emergency > regular {
                return Err(format!(
                    "emergency_{name} ({emergency}) should be <= regular_{name} ({regular})"
                ));
            }
        }

        if self.schedule.seconds_per_day <= 0.0 {
            return Err("seconds_per_day must be positive".into());
        }
        if self.schedule.startup_delay_min > self.schedule.startup_delay_max {
            return Err("startup_delay_min must be <= startup_delay_max".into());
        }

        let c = &self.collection;
        if c.normal_batch_size == 0 || c.emergency_batch_size == 0 {
            return Err("Batch sizes must be at least 1".into());
        }
        if c.inventory_capacity == 0 || c.stack_limit == 0 {
            return Err("Inventory capacity and stack limit must be at least 1".into());
        }

        let p = &self.pathfinding;
        if p.cell_size <= 0.0 || p.partition_cell_size <= 0.0 || self.forage.cell_size <= 0.0 {
            return Err("Cell sizes must be positive".into());
        }
        // A finished path ends on the goal cell center; the target itself may sit
        // anywhere in that cell.
        if c.interaction_distance < p.cell_size * 0.75 {
            return Err(format!(
                "interaction_distance ({}) should be >= 0.75 * cell_size ({:.1})",
                c.interaction_distance,
                p.cell_size * 0.75
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::parse_toml(
            r#"
            [needs]
            emergency_water = 15.0

            [pathfinding]
            max_expansions = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.needs.emergency_water, 15.0);
        assert_eq!(config.needs.regular_water, 50.0);
        assert_eq!(config.pathfinding.max_expansions, 100);
        assert_eq!(config.collection.target_matching, TargetMatching::Proximity);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let result = SimulationConfig::parse_toml(
            r#"
            [needs]
            emergency_water = 60.0
            regular_water = 50.0
            "#,
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_minutes_per_second() {
        let config = SimulationConfig::default();
        assert!((config.minutes_per_second() - 2.4).abs() < 1e-4);
    }
}
