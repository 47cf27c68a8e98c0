//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures that map to an optional `config.toml`. Values
//! not present in the file fall back to the defaults below; the CLI may
//! override individual knobs on top of the loaded config.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [grid]
//! size_x = 100
//! size_y = 100
//! size_z = 100
//! cell_capacity = 1000
//!
//! [vent]
//! spawn_rate = 10
//! token_energy = 50
//!
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Spatial grid dimensions and per-cell mass capacity.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GridConfig {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub cell_capacity: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size_x: 100,
            size_y: 100,
            size_z: 100,
            cell_capacity: 1000,
        }
    }
}

/// Vent placement and spawn cadence.
///
/// A position of `None` places the vent at the center of the floor layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VentConfig {
    pub position: Option<(usize, usize, usize)>,
    pub spawn_rate: u64,
    pub token_energy: i32,
}

impl Default for VentConfig {
    fn default() -> Self {
        Self {
            position: None,
            spawn_rate: 10,
            token_energy: 50,
        }
    }
}

/// Altitude-driven damage model.
///
/// `max_altitude` of `None` tracks the grid height.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DamageConfig {
    pub max_altitude: Option<usize>,
}

/// Top-level simulation configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub vent: VentConfig,
    #[serde(default)]
    pub damage: DamageConfig,
    /// RNG seed; `None` seeds from entropy (non-reproducible runs).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Loads configuration from a toml file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `path` if it exists, otherwise returns defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.size_x == 0 || self.grid.size_y == 0 || self.grid.size_z == 0 {
            return Err(ConfigError::Invalid(
                "grid dimensions must be non-zero".into(),
            ));
        }
        if self.grid.cell_capacity == 0 {
            return Err(ConfigError::Invalid("cell_capacity must be non-zero".into()));
        }
        if self.vent.spawn_rate == 0 {
            return Err(ConfigError::Invalid("spawn_rate must be non-zero".into()));
        }
        Ok(())
    }

    /// Vent position, defaulting to the center of the floor layer.
    pub fn vent_position(&self) -> (usize, usize, usize) {
        self.vent
            .position
            .unwrap_or((self.grid.size_x / 2, self.grid.size_y / 2, 0))
    }

    /// Damage ceiling, defaulting to the grid height.
    pub fn max_altitude(&self) -> f64 {
        self.damage.max_altitude.unwrap_or(self.grid.size_z) as f64
    }
}
