//! Configuration System
//!
//! Loads tuning parameters from savanna.toml for easy adjustment without
//! recompiling.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "savanna.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub spawn: SpawnConfig,
    pub output: OutputConfig,
}

/// World dimensions and run parameters
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    pub height: usize,
    pub width: usize,
    pub rounds: u64,
    pub seed: u64,
}

/// Initial population
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    pub lions: usize,
    pub antelopes: usize,
}

/// Snapshot and event output parameters
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub snapshot_interval: u64,
    pub snapshot_dir: String,
    pub events_path: String,
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(String),
    #[error("could not parse config file: {0}")]
    Parse(String),
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io(error.to_string()))?;
        toml::from_str(&content).map_err(|error| ConfigError::Parse(error.to_string()))
    }

    /// Load configuration from the default path, or use defaults if missing
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|error| {
            tracing::warn!("could not load {DEFAULT_CONFIG_PATH}: {error}; using defaults");
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig {
                height: 10,
                width: 30,
                rounds: 1000,
                seed: 42,
            },
            spawn: SpawnConfig {
                lions: 3,
                antelopes: 8,
            },
            output: OutputConfig {
                snapshot_interval: 100,
                snapshot_dir: "output/snapshots".to_string(),
                events_path: "output/events.jsonl".to_string(),
            },
        }
    }
}
