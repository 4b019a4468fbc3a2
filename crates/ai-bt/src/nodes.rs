//! Per-kind execution logic.
//!
//! Every function here runs *after* the node's guard passed and returns the
//! status [`BehaviorTree::execute`] records. Children are always executed
//! through `tree.execute` so their guards and status bookkeeping apply.

use std::panic::{self, AssertUnwindSafe};

use ai_core::{Character, DeterministicRng, Status};
use ai_tools::{trace, TraceEvent};

use crate::node::NodeKind;
use crate::task::{Task, TaskContext, TaskFault};
use crate::tree::{BehaviorTree, ExecContext, NodeId};

pub(crate) fn run<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let node = tree.node(id);
    let children = node.children.as_slice();
    match &node.kind {
        NodeKind::Sequence => sequence(tree, id, children, ctx),
        NodeKind::PrioritySelector => priority_selector(tree, id, children, ctx),
        NodeKind::ProbabilitySelector { weights } => {
            probability_selector(tree, id, weights, children, ctx)
        }
        NodeKind::RandomSelector => random_selector(tree, id, children, ctx),
        NodeKind::Parallel => parallel(tree, id, children, ctx),
        NodeKind::Invert => decorate(tree, children, ctx, |s| match s {
            Status::Finished => Status::Failed,
            Status::Failed => Status::Finished,
            other => other,
        }),
        NodeKind::Succeed => decorate(tree, children, ctx, |s| match s {
            Status::Running => Status::Running,
            _ => Status::Finished,
        }),
        NodeKind::Fail => decorate(tree, children, ctx, |s| match s {
            Status::Running => Status::Running,
            _ => Status::Failed,
        }),
        NodeKind::Limit { amount } => limit(tree, id, *amount, children, ctx),
        NodeKind::Task(task) => run_task(task.as_ref(), id, ctx),
    }
}

fn sequence<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let entity = ctx.entity;
    let start = ctx.state.selected(id, entity).unwrap_or(0);

    let mut last = Status::Finished;
    for (i, child) in children.iter().enumerate().skip(start) {
        last = tree.execute(*child, ctx);
        match last {
            Status::Running => {
                ctx.state.set_selected(id, entity, Some(i));
                return Status::Running;
            }
            Status::CannotExecute | Status::Failed => {
                tree.reset_below(id, ctx);
                return last;
            }
            // No reset: selector memory survives a fault.
            Status::Exception => return Status::Exception,
            _ => {}
        }
    }

    tree.reset_below(id, ctx);
    last
}

fn priority_selector<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let entity = ctx.entity;
    let start = ctx
        .state
        .selected(id, entity)
        .unwrap_or(0)
        .min(children.len());
    for child in &children[..start] {
        tree.reset(*child, ctx);
    }

    let mut overall = Status::Finished;
    let mut visited = start;
    for (i, child) in children.iter().enumerate().skip(start) {
        visited = i + 1;
        let status = tree.execute(*child, ctx);
        match status {
            Status::Running => {
                ctx.state.set_selected(id, entity, Some(i));
                overall = Status::Running;
                break;
            }
            // Fallback: a failed child never decides the selector's result.
            Status::CannotExecute | Status::Failed => {
                tree.reset(*child, ctx);
                ctx.state.set_selected(id, entity, None);
            }
            _ => {
                ctx.state.set_selected(id, entity, None);
                tree.reset(*child, ctx);
                overall = status;
                break;
            }
        }
    }

    for child in &children[visited..] {
        tree.reset(*child, ctx);
    }
    overall
}

fn random_selector<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let entity = ctx.entity;
    let mut order: Vec<NodeId> = children.to_vec();
    ctx.tick
        .rng_for_entity(entity, u64::from(id.0))
        .shuffle(&mut order);

    let mut overall = Status::Finished;
    for child in order {
        let status = tree.execute(child, ctx);
        match status {
            // Left running; nothing is committed past this tick.
            Status::Running => continue,
            Status::CannotExecute | Status::Failed => overall = status,
            _ => {}
        }
        tree.reset(child, ctx);
    }
    overall
}

fn probability_selector<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    weights: &[f32],
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let entity = ctx.entity;
    let resumed = ctx
        .state
        .selected(id, entity)
        .filter(|i| *i < children.len())
        .filter(|i| ctx.state.last_status(children[*i], entity).is_running());

    let chosen = match resumed {
        Some(i) => i,
        None => {
            let weights: Vec<f32> = (0..children.len())
                .map(|i| weights.get(i).copied().unwrap_or(1.0))
                .collect();
            let mut rng = ctx.tick.rng_for_entity(entity, u64::from(id.0));
            match rng.choose_weighted(&weights) {
                Some(i) => i,
                None => return Status::Failed,
            }
        }
    };

    for (i, child) in children.iter().enumerate() {
        if i != chosen {
            tree.reset(*child, ctx);
        }
    }

    let child = children[chosen];
    let status = tree.execute(child, ctx);
    if status.is_running() {
        ctx.state.set_selected(id, entity, Some(chosen));
    } else {
        ctx.state.set_selected(id, entity, None);
        tree.reset(child, ctx);
    }
    status
}

fn parallel<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let mut any_running = false;
    for child in children {
        if tree.execute(*child, ctx).is_running() {
            any_running = true;
        } else {
            tree.reset(*child, ctx);
        }
    }

    if any_running {
        return Status::Running;
    }
    tree.reset_below(id, ctx);
    Status::Finished
}

fn decorate<C: Character>(
    tree: &BehaviorTree<C>,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
    map: fn(Status) -> Status,
) -> Status {
    match children.first() {
        Some(child) => map(tree.execute(*child, ctx)),
        None => Status::Failed,
    }
}

fn limit<C: Character>(
    tree: &BehaviorTree<C>,
    id: NodeId,
    amount: u32,
    children: &[NodeId],
    ctx: &mut ExecContext<'_, C>,
) -> Status {
    let entity = ctx.entity;
    let Some(child) = children.first() else {
        return Status::Failed;
    };
    if ctx.state.completions(id, entity) >= amount {
        return Status::Failed;
    }

    let status = tree.execute(*child, ctx);
    if !status.is_running() {
        ctx.state.bump_completions(id, entity);
    }
    status
}

fn run_task<C: Character>(task: &dyn Task<C>, id: NodeId, ctx: &mut ExecContext<'_, C>) -> Status {
    let entity = ctx.entity;
    let (state, filtered) = ctx.state.task_parts(id, entity);
    let mut task_ctx = TaskContext {
        character: ctx.character,
        entity,
        zone: ctx.zone,
        tick: ctx.tick,
        node: id,
        first_run: !state.last_status.is_running(),
        timer_millis: &mut state.timer_millis,
        filtered,
        blackboard: &mut *ctx.blackboard,
    };

    let fault = match panic::catch_unwind(AssertUnwindSafe(|| task.run(&mut task_ctx))) {
        Ok(Ok(status)) => return status,
        Ok(Err(fault)) => fault,
        Err(payload) => TaskFault::Panicked(panic_message(payload.as_ref())),
    };
    tracing::warn!(entity = %entity, node = %id, error = %fault, "task fault");
    if trace::enabled(ctx.blackboard) {
        trace::emit(
            ctx.blackboard,
            TraceEvent::task_fault(ctx.tick.tick, entity, id.0),
        );
    }
    Status::Exception
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
