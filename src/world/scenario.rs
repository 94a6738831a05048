//! Scenario files: JSON descriptions of a world to place and simulate
//!
//! A scenario only places what it is given; terrain is never generated.
//! `demo` builds a small fixed layout with seeded resource scatter.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Rect, Vec2};
use crate::world::resources::ResourceType;
use crate::world::state::World;
use crate::world::terrain::Gate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellSpec {
    pub position: Vec2,
    pub water: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub kind: ResourceType,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillagerSpec {
    pub name: String,
    pub home: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub width: f32,
    pub height: f32,
    /// Hour of day at tick zero
    #[serde(default)]
    pub start_hour: Option<f32>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub gates: Vec<Gate>,
    pub communal_storage: Vec2,
    #[serde(default)]
    pub wells: Vec<WellSpec>,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    #[serde(default)]
    pub villagers: Vec<VillagerSpec>,
}

impl ScenarioFile {
    pub fn parse_json(json: &str) -> Result<Self> {
        let scenario: ScenarioFile = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    fn inside(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::InvalidScenario(format!(
                "World size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(hour) = self.start_hour {
            if !(0.0..24.0).contains(&hour) {
                return Err(SimError::InvalidScenario(format!("start_hour {hour} not in [0, 24)")));
            }
        }
        let mut rects = self.obstacles.iter().chain(self.gates.iter().map(|g| &g.rect));
        if let Some(bad) = rects.find(|r| r.width < 0.0 || r.height < 0.0) {
            return Err(SimError::InvalidScenario(format!("Negative rectangle size: {bad:?}")));
        }

        let placed = std::iter::once(("communal storage", self.communal_storage))
            .chain(self.wells.iter().map(|w| ("well", w.position)))
            .chain(self.resources.iter().map(|r| ("resource", r.position)))
            .chain(self.villagers.iter().map(|v| ("villager", v.home)));
        for (what, position) in placed {
            if !self.inside(position) {
                return Err(SimError::InvalidScenario(format!(
                    "{what} at {position:?} is outside the world"
                )));
            }
        }
        Ok(())
    }

    /// Create the world and place everything in file order
    pub fn build(&self, config: SimulationConfig, seed: u64) -> Result<World> {
        self.validate()?;
        let mut world = World::new(
            config,
            seed,
            self.width,
            self.height,
            self.obstacles.clone(),
            self.gates.clone(),
            self.communal_storage,
        )?;
        if let Some(hour) = self.start_hour {
            world.clock = world.clock.clone().starting_at_hour(hour);
        }
        for well in &self.wells {
            world.add_well(well.position, well.water);
        }
        for resource in &self.resources {
            world.add_resource(resource.position, resource.kind);
        }
        for villager in &self.villagers {
            world.spawn_villager(villager.name.clone(), villager.home);
        }
        tracing::info!(
            "Scenario built: {} wells, {} resources, {} villagers",
            self.wells.len(),
            self.resources.len(),
            self.villagers.len()
        );
        Ok(world)
    }
}

const DEMO_NAMES: [&str; 8] = ["Ada", "Bram", "Cora", "Dane", "Elsa", "Finn", "Gwen", "Hale"];

/// Small village: a wall with a gap, a lethal pond, two wells and seeded
/// clusters of every resource kind
pub fn demo(seed: u64, villagers: usize) -> ScenarioFile {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let width = 800.0;
    let height = 600.0;

    let obstacles = vec![
        Rect::new(380.0, 0.0, 20.0, 240.0),
        Rect::new(380.0, 320.0, 20.0, 280.0),
    ];
    let gates = vec![
        Gate::new(Rect::new(560.0, 420.0, 120.0, 80.0), true),
        Gate::new(Rect::new(380.0, 240.0, 20.0, 80.0), false),
    ];
    let blocked = |p: Vec2| {
        obstacles.iter().any(|r| r.intersects_circle(p, 12.0))
            || gates.iter().any(|g| g.lethal && g.rect.intersects_circle(p, 12.0))
    };

    let mut resources = Vec::new();
    for (i, kind) in ResourceType::ALL.iter().enumerate() {
        // Two clusters per kind, one on each side of the wall
        for side in 0..2 {
            let center = Vec2::new(
                if side == 0 { 60.0 + 40.0 * i as f32 } else { 440.0 + 40.0 * i as f32 },
                rng.gen_range(40.0..height - 40.0),
            );
            let mut placed = 0;
            let mut attempts = 0;
            while placed < 4 && attempts < 40 {
                attempts += 1;
                let p = Vec2::new(
                    (center.x + rng.gen_range(-30.0..30.0)).clamp(5.0, width - 5.0),
                    (center.y + rng.gen_range(-30.0..30.0)).clamp(5.0, height - 5.0),
                );
                if !blocked(p) {
                    resources.push(ResourceSpec { kind: *kind, position: p });
                    placed += 1;
                }
            }
        }
    }

    let villagers = (0..villagers)
        .map(|i| VillagerSpec {
            name: DEMO_NAMES
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("Villager {i}")),
            home: Vec2::new(120.0 + 50.0 * (i % 5) as f32, 160.0 + 60.0 * (i / 5) as f32),
        })
        .collect();

    ScenarioFile {
        width,
        height,
        start_hour: None,
        obstacles,
        gates,
        communal_storage: Vec2::new(250.0, 300.0),
        wells: vec![
            WellSpec { position: Vec2::new(200.0, 420.0), water: 200.0 },
            WellSpec { position: Vec2::new(620.0, 160.0), water: 200.0 },
        ],
        resources,
        villagers,
    }
}
