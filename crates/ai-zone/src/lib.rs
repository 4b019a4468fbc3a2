//! Zones: groups of AIs ticked together.
//!
//! A [`Zone`] owns the AIs of one level or region and updates all of them once
//! per round, sharded across a rayon pool so that no AI is ever touched by two
//! threads at once. A [`Scheduler`] drives rounds at a fixed rate.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod collections;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod zone;

pub use collections::{ConcurrentMap, ConcurrentQueue};
pub use config::ZoneConfig;
pub use error::{ConfigError, Result, ZoneError};
pub use scheduler::{Scheduler, TaskHandle};
pub use zone::Zone;
