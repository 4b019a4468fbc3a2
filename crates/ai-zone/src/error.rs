use std::path::PathBuf;

use ai_core::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("entity {0} is already registered in this zone")]
    DuplicateEntity(EntityId),

    #[error("entity {0} is not registered in this zone")]
    UnknownEntity(EntityId),

    #[error("failed to build tick thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("scheduler has been shut down")]
    SchedulerStopped,
}

pub type Result<T> = std::result::Result<T, ZoneError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse zone config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
