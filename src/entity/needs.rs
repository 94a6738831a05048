//! Survival needs that drive villager behavior
//!
//! Every need lives on `[0, 100]` where 100 is fully satisfied. Any need
//! reaching zero is fatal.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::NeedConfig;
use crate::world::resources::Nutrition;

pub const VITAMIN_COUNT: usize = 3;
pub const NEED_MAX: f32 = 100.0;

/// Water lost when eating something poisonous
const POISON_WATER_PENALTY: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    Temperature,
    Water,
    Calories,
    Vitamin(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub temperature: f32,
    pub water: f32,
    pub calories: f32,
    pub vitamins: [f32; VITAMIN_COUNT],
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            temperature: 80.0,
            water: 80.0,
            calories: 80.0,
            vitamins: [80.0; VITAMIN_COUNT],
        }
    }
}

/// Per-minute decay, fixed for a villager's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayRates {
    pub temperature: f32,
    pub water: f32,
    pub calories: f32,
    pub vitamins: [f32; VITAMIN_COUNT],
}

impl DecayRates {
    pub fn from_config(config: &NeedConfig) -> Self {
        Self {
            temperature: config.temperature_decay,
            water: config.water_decay,
            calories: config.calories_decay,
            vitamins: [config.vitamin_decay; VITAMIN_COUNT],
        }
    }

    /// Base rates scaled by a random factor in `1 ± daily_variance`, drawn
    /// independently per need
    pub fn sample(config: &NeedConfig, rng: &mut impl Rng) -> Self {
        let spread = config.daily_variance.abs();
        let mut jitter = |base: f32| {
            if spread > 0.0 {
                base * rng.gen_range(1.0 - spread..=1.0 + spread)
            } else {
                base
            }
        };
        let mut vitamins = [0.0; VITAMIN_COUNT];
        for v in vitamins.iter_mut() {
            *v = jitter(config.vitamin_decay);
        }
        Self {
            temperature: jitter(config.temperature_decay),
            water: jitter(config.water_decay),
            calories: jitter(config.calories_decay),
            vitamins,
        }
    }
}

impl Needs {
    pub fn get(&self, need: NeedType) -> f32 {
        match need {
            NeedType::Temperature => self.temperature,
            NeedType::Water => self.water,
            NeedType::Calories => self.calories,
            NeedType::Vitamin(i) => self.vitamins[i],
        }
    }

    fn slot(&mut self, need: NeedType) -> &mut f32 {
        match need {
            NeedType::Temperature => &mut self.temperature,
            NeedType::Water => &mut self.water,
            NeedType::Calories => &mut self.calories,
            NeedType::Vitamin(i) => &mut self.vitamins[i],
        }
    }

    /// Decay over `minutes` of simulated time
    pub fn decay(&mut self, minutes: f32, rates: &DecayRates, multiplier: f32) {
        let m = minutes * multiplier;
        self.adjust(NeedType::Temperature, -rates.temperature * m);
        self.adjust(NeedType::Water, -rates.water * m);
        self.adjust(NeedType::Calories, -rates.calories * m);
        for i in 0..VITAMIN_COUNT {
            self.adjust(NeedType::Vitamin(i), -rates.vitamins[i] * m);
        }
    }

    /// Add (or subtract) and clamp to `[0, 100]`
    pub fn adjust(&mut self, need: NeedType, amount: f32) {
        let value = self.slot(need);
        *value = (*value + amount).clamp(0.0, NEED_MAX);
    }

    pub fn restore(&mut self, need: NeedType, amount: f32) {
        self.adjust(need, amount.max(0.0));
    }

    pub fn apply_nutrition(&mut self, nutrition: &Nutrition) {
        self.adjust(NeedType::Calories, nutrition.calories);
        self.adjust(NeedType::Water, nutrition.water);
        for (i, v) in nutrition.vitamins.iter().enumerate() {
            self.adjust(NeedType::Vitamin(i), *v);
        }
        if nutrition.poisonous {
            self.adjust(NeedType::Water, -POISON_WATER_PENALTY);
        }
    }

    /// The first need at or below zero, if any
    pub fn depleted(&self) -> Option<NeedType> {
        let mut all = vec![NeedType::Temperature, NeedType::Water, NeedType::Calories];
        all.extend((0..VITAMIN_COUNT).map(NeedType::Vitamin));
        all.into_iter().find(|n| self.get(*n) <= 0.0)
    }

    pub fn all_in_range(&self) -> bool {
        let in_range = |v: f32| (0.0..=NEED_MAX).contains(&v);
        in_range(self.temperature)
            && in_range(self.water)
            && in_range(self.calories)
            && self.vitamins.iter().all(|v| in_range(*v))
    }
}
