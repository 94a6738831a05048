//! Headless Villager Sim Runner
//!
//! Steps a scenario for a fixed number of ticks and prints a JSON summary.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use villager_sim::core::config::SimulationConfig;
use villager_sim::core::error::Result;
use villager_sim::world::scenario::{self, ScenarioFile};
use villager_sim::world::WorldSnapshot;

/// Headless runner - steps a village and reports who survived
#[derive(Parser, Debug)]
#[command(name = "villager-sim")]
#[command(about = "Run a villager survival scenario and print a JSON summary")]
struct Args {
    /// Scenario JSON file (uses the built-in demo village if omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 6000)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Villagers in the demo village
    #[arg(long, default_value_t = 4)]
    villagers: usize,

    /// Also write the summary to this file
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    survivors: usize,
    events: BTreeMap<&'static str, u64>,
    world: WorldSnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("villager_sim=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => ScenarioFile::load(path)?,
        None => scenario::demo(args.seed, args.villagers),
    };
    let mut world = scenario.build(config, args.seed)?;

    tracing::info!("Running {} ticks of {}s", args.ticks, args.dt);
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for _ in 0..args.ticks {
        for event in world.step(args.dt)? {
            *counts.entry(event.name()).or_insert(0) += 1;
        }
        if world.villagers.is_empty() {
            tracing::info!("No villagers left at tick {}", world.current_tick());
            break;
        }
    }

    let summary = RunSummary {
        seed: args.seed,
        ticks: world.current_tick(),
        survivors: world.alive_count(),
        events: counts,
        world: world.snapshot(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    if let Some(path) = &args.summary {
        std::fs::write(path, &json)?;
    }
    println!("{}", json);
    Ok(())
}
