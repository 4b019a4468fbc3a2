//! Zone configuration, loaded from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Used in logs and worker thread names.
    #[serde(default = "default_name")]
    pub name: String,

    /// Round period when driven by a [`crate::Scheduler`], also the delta
    /// handed to every AI.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// Tick pool size; `0` lets rayon pick one thread per core.
    pub worker_threads: usize,

    /// Shard rounds across the pool. When off, AIs are updated in id order on
    /// the calling thread.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Lower bound on AIs per shard.
    #[serde(default = "default_min_shard_len")]
    pub min_shard_len: usize,

    /// Publish a snapshot of every AI after each round.
    pub debug: bool,

    /// Seed given to every AI entering the zone. AIs keep their own when unset.
    pub seed: Option<u64>,
}

fn default_name() -> String {
    "zone".to_string()
}

fn default_tick_millis() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_min_shard_len() -> usize {
    16
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            tick_millis: default_tick_millis(),
            worker_threads: 0,
            parallel: default_true(),
            min_shard_len: default_min_shard_len(),
            debug: false,
            seed: None,
        }
    }
}

impl ZoneConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
