//! Frozen behavior trees.
//!
//! A finished [`TreeNode`] hierarchy is flattened into an arena in pre-order, so
//! every subtree occupies the contiguous id range `[id, end)`. Resetting a
//! subtree for one entity is then a range clear on the entity's state table.

use std::fmt;

use ai_core::{Blackboard, Character, EntityId, Status, TickContext, ZoneView};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, NodeSnapshot, TraceEvent};

use crate::condition::{Condition, ConditionContext};
use crate::node::{NodeKind, TreeNode};
use crate::nodes;
use crate::state::EntityState;

/// Structural node id: the node's pre-order index in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct FlatNode<C: Character> {
    pub(crate) name: String,
    pub(crate) parameters: String,
    pub(crate) condition: Condition<C>,
    pub(crate) kind: NodeKind<C>,
    pub(crate) children: Vec<NodeId>,
    /// One past the last id of this node's subtree.
    pub(crate) end: u32,
}

/// Everything one node execution may touch. Built once per AI update and
/// threaded through the whole traversal.
pub struct ExecContext<'a, C: Character> {
    pub character: &'a C,
    pub entity: EntityId,
    pub zone: Option<&'a dyn ZoneView>,
    pub tick: &'a TickContext,
    pub state: &'a mut EntityState,
    pub blackboard: &'a mut Blackboard,
}

impl<'a, C: Character> ExecContext<'a, C> {
    pub fn new(
        character: &'a C,
        tick: &'a TickContext,
        state: &'a mut EntityState,
        blackboard: &'a mut Blackboard,
    ) -> Self {
        Self {
            entity: character.id(),
            character,
            zone: None,
            tick,
            state,
            blackboard,
        }
    }

    pub fn with_zone(mut self, zone: Option<&'a dyn ZoneView>) -> Self {
        self.zone = zone;
        self
    }

    pub(crate) fn condition_context(&mut self) -> ConditionContext<'_, C> {
        ConditionContext {
            character: self.character,
            entity: self.entity,
            zone: self.zone,
            tick: self.tick,
            filtered: self.state.filtered_mut(),
            blackboard: &*self.blackboard,
        }
    }
}

/// An immutable behavior definition, shareable between any number of AIs.
pub struct BehaviorTree<C: Character> {
    name: String,
    nodes: Vec<FlatNode<C>>,
}

impl<C: Character> BehaviorTree<C> {
    pub fn new(name: impl Into<String>, root: TreeNode<C>) -> Self {
        let mut nodes = Vec::with_capacity(root.count());
        flatten(&mut nodes, root);
        Self {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node in pre-order with this exact name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.index()).map(|n| n.name.as_str())
    }

    pub fn name_with_parameters(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(id.index())?;
        if node.parameters.is_empty() {
            Some(node.name.clone())
        } else {
            Some(format!("{}{{{}}}", node.name, node.parameters))
        }
    }

    pub fn condition_text(&self, id: NodeId) -> Option<String> {
        self.nodes
            .get(id.index())
            .map(|n| n.condition.name_with_conditions())
    }

    pub(crate) fn node(&self, id: NodeId) -> &FlatNode<C> {
        &self.nodes[id.index()]
    }

    /// Evaluates the node's guard, runs it, and records the result as the
    /// node's last status for `ctx.entity`.
    pub fn execute(&self, id: NodeId, ctx: &mut ExecContext<'_, C>) -> Status {
        let Some(node) = self.nodes.get(id.index()) else {
            return Status::Unknown;
        };

        let entity = ctx.entity;
        let previous = ctx.state.last_status(id, entity);
        let allowed =
            node.condition.is_always() || node.condition.evaluate(&mut ctx.condition_context());
        let status = if allowed {
            nodes::run(self, id, ctx)
        } else {
            Status::CannotExecute
        };

        let state = ctx.state.entry(id, entity);
        state.last_status = status;
        state.last_exec_millis = Some(ctx.tick.time_millis);

        if previous != status && trace_enabled(ctx.blackboard) {
            trace_emit(
                ctx.blackboard,
                TraceEvent::node_status(ctx.tick.tick, entity, id.0, status),
            );
        }
        status
    }

    /// Clears `id` and its descendants for `ctx.entity`. Every cleared node
    /// that had a status recorded traces its transition back to `Unknown`.
    pub(crate) fn reset(&self, id: NodeId, ctx: &mut ExecContext<'_, C>) {
        self.clear_traced(id, id.0, ctx);
    }

    /// Like [`reset`](Self::reset) for the node currently executing: its own
    /// status is recorded again by `execute`, so only descendants are traced.
    pub(crate) fn reset_below(&self, id: NodeId, ctx: &mut ExecContext<'_, C>) {
        self.clear_traced(id, id.0 + 1, ctx);
    }

    fn clear_traced(&self, id: NodeId, traced_from: u32, ctx: &mut ExecContext<'_, C>) {
        let Some(node) = self.nodes.get(id.index()) else {
            return;
        };
        let entity = ctx.entity;
        let traced = trace_enabled(ctx.blackboard);
        for n in id.0..node.end {
            let node_id = NodeId(n);
            let recorded = ctx.state.last_status(node_id, entity);
            ctx.state.clear_node(node_id, entity);
            if traced && n >= traced_from && recorded != Status::Unknown {
                trace_emit(
                    ctx.blackboard,
                    TraceEvent::node_status(ctx.tick.tick, entity, n, Status::Unknown),
                );
            }
        }
    }

    /// Clears the per-entity state of `id` and every descendant without
    /// tracing. Used outside a tick, where no blackboard is at hand.
    pub fn reset_state(&self, id: NodeId, state: &mut EntityState, entity: EntityId) {
        let Some(node) = self.nodes.get(id.index()) else {
            return;
        };
        for n in id.0..node.end {
            state.clear_node(NodeId(n), entity);
        }
    }

    pub fn last_status(&self, id: NodeId, state: &EntityState, entity: EntityId) -> Status {
        state.last_status(id, entity)
    }

    pub fn selected_child(&self, id: NodeId, state: &EntityState, entity: EntityId) -> Option<usize> {
        state.selected(id, entity)
    }

    /// Read-only view of the whole tree's live state for one entity.
    pub fn snapshot(&self, state: &EntityState, entity: EntityId) -> NodeSnapshot {
        self.snapshot_node(NodeId::ROOT, state, entity)
    }

    fn snapshot_node(&self, id: NodeId, state: &EntityState, entity: EntityId) -> NodeSnapshot {
        let node = self.node(id);
        NodeSnapshot {
            id: id.0,
            name: self.name_with_parameters(id).unwrap_or_default(),
            condition: node.condition.name_with_conditions(),
            status: state.last_status(id, entity),
            children: node
                .children
                .iter()
                .map(|c| self.snapshot_node(*c, state, entity))
                .collect(),
        }
    }
}

fn flatten<C: Character>(nodes: &mut Vec<FlatNode<C>>, node: TreeNode<C>) -> NodeId {
    let id = NodeId(nodes.len() as u32);
    let (name, parameters, condition, kind, children) = node.into_parts();
    nodes.push(FlatNode {
        name,
        parameters,
        condition,
        kind,
        children: Vec::new(),
        end: id.0 + 1,
    });

    let child_ids: Vec<NodeId> = children
        .into_iter()
        .map(|child| flatten(nodes, child))
        .collect();
    let end = nodes.len() as u32;
    let flat = &mut nodes[id.index()];
    flat.children = child_ids;
    flat.end = end;
    id
}

impl<C: Character> fmt::Debug for BehaviorTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
