//! Simulation clock for time-of-day tracking
//!
//! The external driver advances the clock with a variable `dt` in seconds;
//! the clock converts that into ticks, simulated minutes and hour of day.

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Elapsed simulation time with day/hour granularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    tick: Tick,
    elapsed: f64,
    seconds_per_day: f32,
    /// Hour of day at `elapsed == 0`
    start_hour: f32,
}

impl Clock {
    pub fn new(seconds_per_day: f32) -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            seconds_per_day,
            start_hour: 8.0,
        }
    }

    pub fn starting_at_hour(mut self, hour: f32) -> Self {
        self.start_hour = hour.rem_euclid(24.0);
        self
    }

    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed += dt as f64;
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Seconds since the simulation started
    pub fn now(&self) -> f64 {
        self.elapsed
    }

    pub fn current_day(&self) -> u64 {
        let start = self.start_hour as f64 / 24.0 * self.seconds_per_day as f64;
        ((self.elapsed + start) / self.seconds_per_day as f64) as u64
    }

    /// Fractional hour of day in `[0, 24)`
    pub fn hour_of_day(&self) -> f32 {
        let day_fraction = (self.elapsed / self.seconds_per_day as f64).fract() as f32;
        (self.start_hour + day_fraction * 24.0).rem_euclid(24.0)
    }
}

/// True if `hour` lies in `[start, end)`, wrapping around midnight when
/// `start > end`
pub fn hour_in_window(hour: f32, start: f32, end: f32) -> bool {
    let hour = hour.rem_euclid(24.0);
    let start = start.rem_euclid(24.0);
    let end = end.rem_euclid(24.0);
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}
