//! Resource kinds and the nutrition lookup capability
//!
//! Nutrition and run speed are pure functions of the world seed. The AI only
//! sees them through [`ResourceCatalog`].

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::entity::needs::VITAMIN_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Berries,
    Mushrooms,
    Apples,
    Rabbit,
    Deer,
    Sticks,
    Logs,
    Pinecones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    Food,
    Burnable,
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Berries,
        ResourceType::Mushrooms,
        ResourceType::Apples,
        ResourceType::Rabbit,
        ResourceType::Deer,
        ResourceType::Sticks,
        ResourceType::Logs,
        ResourceType::Pinecones,
    ];

    pub fn category(&self) -> ResourceCategory {
        match self {
            ResourceType::Sticks | ResourceType::Logs | ResourceType::Pinecones => {
                ResourceCategory::Burnable
            }
            _ => ResourceCategory::Food,
        }
    }

    /// Animals may run away from a forager
    pub fn is_animal(&self) -> bool {
        matches!(self, ResourceType::Rabbit | ResourceType::Deer)
    }

    pub fn of_category(category: ResourceCategory) -> impl Iterator<Item = ResourceType> {
        Self::ALL.into_iter().filter(move |k| k.category() == category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f32,
    pub water: f32,
    pub vitamins: [f32; VITAMIN_COUNT],
    /// Wood units added to a fireplace when burned
    pub fire_value: f32,
    pub poisonous: bool,
}

/// Lookup capability supplied by the world collaborator
pub trait ResourceCatalog {
    fn nutrition(&self, kind: ResourceType) -> Nutrition;
    fn run_speed(&self, kind: ResourceType) -> f32;
}

/// Catalog derived deterministically from a world seed
#[derive(Debug, Clone)]
pub struct SeededCatalog {
    seed: u64,
    nutrition: AHashMap<ResourceType, Nutrition>,
    run_speed: AHashMap<ResourceType, f32>,
}

impl SeededCatalog {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut nutrition = AHashMap::new();
        let mut run_speed = AHashMap::new();

        for kind in ResourceType::ALL {
            let entry = match kind.category() {
                ResourceCategory::Food => {
                    let mut vitamins = [0.0; VITAMIN_COUNT];
                    for v in vitamins.iter_mut() {
                        *v = rng.gen_range(0.0..10.0);
                    }
                    Nutrition {
                        calories: rng.gen_range(10.0..40.0),
                        water: rng.gen_range(0.0..15.0),
                        vitamins,
                        fire_value: 0.0,
                        poisonous: kind == ResourceType::Mushrooms && rng.gen_bool(0.5),
                    }
                }
                ResourceCategory::Burnable => {
                    let base = if kind == ResourceType::Logs { 3.0 } else { 1.0 };
                    Nutrition {
                        calories: 0.0,
                        water: 0.0,
                        vitamins: [0.0; VITAMIN_COUNT],
                        fire_value: base + rng.gen_range(0.0..1.0),
                        poisonous: false,
                    }
                }
            };
            nutrition.insert(kind, entry);

            let speed = match kind {
                ResourceType::Rabbit => rng.gen_range(30.0..60.0),
                ResourceType::Deer => rng.gen_range(35.0..70.0),
                _ => 0.0,
            };
            run_speed.insert(kind, speed);
        }

        Self {
            seed,
            nutrition,
            run_speed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Pin a kind's nutrition (scenarios and tests)
    pub fn set_nutrition(&mut self, kind: ResourceType, nutrition: Nutrition) {
        self.nutrition.insert(kind, nutrition);
    }

    pub fn set_run_speed(&mut self, kind: ResourceType, speed: f32) {
        self.run_speed.insert(kind, speed);
    }
}

impl ResourceCatalog for SeededCatalog {
    fn nutrition(&self, kind: ResourceType) -> Nutrition {
        // Every kind is populated in `new`
        self.nutrition[&kind].clone()
    }

    fn run_speed(&self, kind: ResourceType) -> f32 {
        self.run_speed.get(&kind).copied().unwrap_or(0.0)
    }
}
