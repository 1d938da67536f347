//! Match configuration
//!
//! Every arena constant is configurable; the defaults reproduce the classic
//! 12x12 arena. Configurations are read from JSON with missing fields taking
//! their default values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest accepted arena side length
pub const MAX_GRID_SIZE: i32 = 256;

/// Largest accepted fuel capacity. Costs are capped at the capacity, so the
/// per-tick sum of all four costs stays well inside `i32`.
pub const MAX_FUEL_LIMIT: i32 = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Side length of the square arena
    pub grid_size: i32,
    pub max_fuel: i32,
    /// Base cost paid every tick
    pub wait_cost: i32,
    pub move_cost: i32,
    pub turn_cost: i32,
    /// Paid every tick the shield is up
    pub shield_cost: i32,
    pub barrel_spawn_chance: f64,
    pub initial_barrels: usize,
    pub seed: u64,
    pub max_ticks: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_size: 12,
            max_fuel: 100,
            wait_cost: 3,
            move_cost: 3,
            turn_cost: 2,
            shield_cost: 2,
            barrel_spawn_chance: 0.1,
            initial_barrels: 2,
            seed: 0,
            max_ticks: 1000,
        }
    }
}

impl MatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be within [2, {}], got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        if !(1..=MAX_FUEL_LIMIT).contains(&self.max_fuel) {
            return Err(ConfigError::Invalid(format!(
                "max_fuel must be within [1, {}], got {}",
                MAX_FUEL_LIMIT, self.max_fuel
            )));
        }
        for (name, cost) in [
            ("wait_cost", self.wait_cost),
            ("move_cost", self.move_cost),
            ("turn_cost", self.turn_cost),
            ("shield_cost", self.shield_cost),
        ] {
            if !(0..=self.max_fuel).contains(&cost) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, max_fuel = {}], got {}",
                    name, self.max_fuel, cost
                )));
            }
        }
        let cells = (self.grid_size * self.grid_size) as usize;
        if self.initial_barrels > cells {
            return Err(ConfigError::Invalid(format!(
                "initial_barrels must not exceed the {} arena cells, got {}",
                cells, self.initial_barrels
            )));
        }
        if !(0.0..=1.0).contains(&self.barrel_spawn_chance) {
            return Err(ConfigError::Invalid(format!(
                "barrel_spawn_chance must be within [0, 1], got {}",
                self.barrel_spawn_chance
            )));
        }
        Ok(())
    }
}
