//! Leaf behaviors.

use ai_core::{Blackboard, Character, EntityId, Status, TickContext, ZoneView};
use thiserror::Error;

use crate::tree::NodeId;

/// Unexpected failure inside a leaf task.
///
/// Converted into [`Status::Exception`] at the node boundary; it never aborts the
/// tick for the rest of the tree.
#[derive(Debug, Error)]
pub enum TaskFault {
    #[error("{0}")]
    Message(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TaskFault {
    pub fn msg(message: impl Into<String>) -> Self {
        TaskFault::Message(message.into())
    }
}

/// Everything a task may read or touch while it runs for one entity.
pub struct TaskContext<'a, C: Character> {
    pub character: &'a C,
    pub entity: EntityId,
    pub zone: Option<&'a dyn ZoneView>,
    pub tick: &'a TickContext,
    pub node: NodeId,
    /// `true` unless this node returned `Running` for this entity last time.
    pub first_run: bool,
    /// Per-entity scratch timer, cleared whenever the node's state is reset.
    pub timer_millis: &'a mut i64,
    /// Result of the most recent `Filter` condition.
    pub filtered: &'a [EntityId],
    pub blackboard: &'a mut Blackboard,
}

impl<C: Character> TaskContext<'_, C> {
    pub fn delta_millis(&self) -> u64 {
        self.tick.delta_millis
    }
}

pub trait Task<C: Character>: Send + Sync + 'static {
    fn run(&self, ctx: &mut TaskContext<'_, C>) -> Result<Status, TaskFault>;
}

pub(crate) struct FnTask<F>(pub(crate) F);

impl<C, F> Task<C> for FnTask<F>
where
    C: Character,
    F: Fn(&mut TaskContext<'_, C>) -> Result<Status, TaskFault> + Send + Sync + 'static,
{
    fn run(&self, ctx: &mut TaskContext<'_, C>) -> Result<Status, TaskFault> {
        (self.0)(ctx)
    }
}

/// Waits for a number of milliseconds of accumulated tick time.
///
/// The first run arms the timer and reports `Running`; later runs subtract their
/// delta and finish once the timer is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Idle {
    millis: u64,
}

impl Idle {
    pub fn new(millis: u64) -> Self {
        Self { millis }
    }

    pub fn millis(&self) -> u64 {
        self.millis
    }
}

impl<C: Character> Task<C> for Idle {
    fn run(&self, ctx: &mut TaskContext<'_, C>) -> Result<Status, TaskFault> {
        if self.millis == 0 {
            return Ok(Status::Finished);
        }
        if ctx.first_run {
            *ctx.timer_millis = i64::try_from(self.millis).unwrap_or(i64::MAX);
            return Ok(Status::Running);
        }

        let delta = i64::try_from(ctx.delta_millis()).unwrap_or(i64::MAX);
        *ctx.timer_millis = ctx.timer_millis.saturating_sub(delta);
        if *ctx.timer_millis <= 0 {
            Ok(Status::Finished)
        } else {
            Ok(Status::Running)
        }
    }
}

/// Logs its text and finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Print {
    text: String,
}

impl Print {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl<C: Character> Task<C> for Print {
    fn run(&self, ctx: &mut TaskContext<'_, C>) -> Result<Status, TaskFault> {
        tracing::info!(entity = %ctx.entity, tick = ctx.tick.tick, "{}", self.text);
        Ok(Status::Finished)
    }
}
