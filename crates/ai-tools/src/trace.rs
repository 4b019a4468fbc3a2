//! Trace events recorded while AIs tick.
//!
//! Tracing is opt-in per AI: nothing is built unless the AI's blackboard holds
//! a [`TRACE_LOG`] or a [`TRACE_SINK`].

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ai_core::{BbKey, Blackboard, EntityId, Status};

/// A node's recorded status changed. `a` is the node id, `b` the status code.
pub const NODE_STATUS: &str = "bt.node.status";
/// A leaf task failed or panicked. `a` is the node id.
pub const TASK_FAULT: &str = "bt.task.fault";

/// Plain data so it can be recorded during a tick and rendered later by tooling.
/// `a`/`b` are tag-specific payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub entity: EntityId,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            entity: EntityId(0),
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn node_status(tick: u64, entity: EntityId, node: u32, status: Status) -> Self {
        Self::new(tick, NODE_STATUS)
            .with_entity(entity)
            .with_a(u64::from(node))
            .with_b(status.code())
    }

    pub fn task_fault(tick: u64, entity: EntityId, node: u32) -> Self {
        Self::new(tick, TASK_FAULT)
            .with_entity(entity)
            .with_a(u64::from(node))
    }

    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

/// Streaming consumer of trace events. Lives in an AI's blackboard, so it
/// must be movable between zone workers.
pub trait TraceSink: Send + Sync {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    /// Decoded `bt.node.status` events as `(tick, node id, status)`.
    pub fn status_changes(&self) -> impl Iterator<Item = (u64, u32, Status)> + '_ {
        self.with_tag(NODE_STATUS).map(|e| {
            let node = u32::try_from(e.a).unwrap_or(u32::MAX);
            (e.tick, node, Status::from_code(e.b))
        })
    }
}

/// In-memory event log.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new(0xA11D_7ACE_0000_0001);
/// User-provided streaming sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new(0xA11D_7ACE_0000_0002);

/// Whether anybody listens; lets callers skip building events.
pub fn enabled(blackboard: &Blackboard) -> bool {
    blackboard.contains(TRACE_LOG) || blackboard.contains(TRACE_SINK)
}

/// Delivers `event` to the log and the sink, whichever are present.
pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if !blackboard.contains(TRACE_SINK) {
        if let Some(log) = blackboard.get_mut(TRACE_LOG) {
            log.push(event);
        }
        return;
    }
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event);
    }
}
