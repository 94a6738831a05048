pub mod events;
pub mod tick;

pub use events::{CollectSource, DeathCause, SimulationEvent};
pub use tick::run_simulation_tick;
