//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! Enable only the layers you need: `core` for the primitives, `bt` for the
//! tree interpreter, `zone` for parallel ticking and `tools` for tracing and
//! snapshots.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use ai_bt as bt;

#[cfg(feature = "zone")]
#[cfg_attr(docsrs, doc(cfg(feature = "zone")))]
pub use ai_zone as zone;

/// The types most programs touch.
#[cfg(feature = "full")]
pub mod prelude {
    pub use ai_bt::{
        Ai, AiRegistry, BehaviorTree, Condition, ConditionFactoryContext, Filter,
        FilterFactoryContext, NodeFactoryContext, Task, TaskContext, TaskFault, TreeNode,
    };
    pub use ai_core::{Character, EntityId, Status, ZoneView};
    pub use ai_tools::{AiSnapshot, NodeSnapshot, TraceLog, TRACE_LOG};
    pub use ai_zone::{Scheduler, Zone, ZoneConfig};
}
