//! Engine-agnostic primitives shared by the behavior-tree runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod entity;
pub mod rng;
pub mod status;
pub mod tick;
pub mod zone;

pub use blackboard::{BbKey, Blackboard};
pub use entity::{Character, EntityId};
pub use rng::{DeterministicRng, SplitMix64};
pub use status::Status;
pub use tick::TickContext;
pub use zone::ZoneView;
