//! Configuration management for MiniChain

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{warn, Level};

/// Highest difficulty a SHA-256 hex digest can satisfy.
pub const MAX_DIFFICULTY: u32 = 64;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
            log_level: default_log_level(),
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            threads: default_threads(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.node.owner_id.is_empty() {
            return Err(ChainError::ConfigError("node.owner_id must be set".to_string()));
        }
        if self.database.path.is_empty() {
            return Err(ChainError::ConfigError("database.path must be set".to_string()));
        }
        if self.miner.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::InvalidDifficulty(format!(
                "miner.difficulty {} exceeds {}",
                self.miner.difficulty, MAX_DIFFICULTY
            )));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, ChainError> {
        self.node
            .log_level
            .parse::<Level>()
            .map_err(|_| ChainError::ConfigError(format!("Unknown log level '{}'", self.node.log_level)))
    }
}

/// Reads and validates a TOML config. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let config: Config = match fs::read_to_string(path) {
        Ok(config_str) => toml::from_str(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found, using defaults", path.display());
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.validate()?;
    Ok(config)
}

fn default_owner_id() -> String {
    "node".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_difficulty() -> u32 {
    crate::node::DEFAULT_DIFFICULTY
}

fn default_threads() -> usize {
    1
}

fn default_db_path() -> String {
    "./data/chain.db".to_string()
}
