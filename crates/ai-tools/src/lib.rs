//! Tooling primitives for the behavior-tree runtime.
//!
//! Lightweight and engine-agnostic: trace events recorded while ticking, and
//! read-only snapshots of a tree's per-entity state for debuggers.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod snapshot;
pub mod trace;

pub use snapshot::{AiSnapshot, NodeSnapshot};
pub use trace::{
    emit, enabled, TraceEvent, TraceLog, TraceSink, NODE_STATUS, TASK_FAULT, TRACE_LOG, TRACE_SINK,
};
