pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{hour_in_window, Clock};
pub use config::SimulationConfig;
pub use error::{Result, SimError};
