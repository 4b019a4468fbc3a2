//! Per-entity execution state.
//!
//! Tree nodes are shared between every entity running the same behavior, so the
//! mutable half of the state machine lives here, keyed by `(node, entity)`.

use std::collections::BTreeMap;

use ai_core::{EntityId, Status};

use crate::tree::NodeId;

/// Mutable state of one node for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub last_status: Status,
    /// Child index a selector resumes at. `None` means nothing is selected.
    pub selected: Option<usize>,
    /// Scratch timer for leaf tasks (see [`crate::Idle`]).
    pub timer_millis: i64,
    /// Simulation time of the last execution.
    pub last_exec_millis: Option<u64>,
}

#[derive(Debug, Default)]
pub struct EntityState {
    nodes: BTreeMap<(NodeId, EntityId), NodeState>,
    // Lifetime counters: subtree resets leave these alone.
    completions: BTreeMap<(NodeId, EntityId), u32>,
    filtered: Vec<EntityId>,
}

impl EntityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId, entity: EntityId) -> Option<&NodeState> {
        self.nodes.get(&(node, entity))
    }

    pub fn entry(&mut self, node: NodeId, entity: EntityId) -> &mut NodeState {
        self.nodes.entry((node, entity)).or_default()
    }

    pub fn last_status(&self, node: NodeId, entity: EntityId) -> Status {
        self.get(node, entity)
            .map(|s| s.last_status)
            .unwrap_or_default()
    }

    /// Records `status` and returns the previous one.
    pub fn set_last_status(&mut self, node: NodeId, entity: EntityId, status: Status) -> Status {
        std::mem::replace(&mut self.entry(node, entity).last_status, status)
    }

    pub fn selected(&self, node: NodeId, entity: EntityId) -> Option<usize> {
        self.get(node, entity).and_then(|s| s.selected)
    }

    pub fn set_selected(&mut self, node: NodeId, entity: EntityId, selected: Option<usize>) {
        match selected {
            Some(_) => self.entry(node, entity).selected = selected,
            None => {
                if let Some(state) = self.nodes.get_mut(&(node, entity)) {
                    state.selected = None;
                }
            }
        }
    }

    /// Forget everything recorded for `node` (but not its completion counter).
    pub fn clear_node(&mut self, node: NodeId, entity: EntityId) {
        self.nodes.remove(&(node, entity));
    }

    pub fn completions(&self, node: NodeId, entity: EntityId) -> u32 {
        self.completions.get(&(node, entity)).copied().unwrap_or(0)
    }

    pub fn bump_completions(&mut self, node: NodeId, entity: EntityId) -> u32 {
        let count = self.completions.entry((node, entity)).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Entities selected by the most recent `Filter` condition.
    pub fn filtered(&self) -> &[EntityId] {
        &self.filtered
    }

    pub fn filtered_mut(&mut self) -> &mut Vec<EntityId> {
        &mut self.filtered
    }

    /// Split borrow used by leaf execution: the node's own state plus the
    /// filtered-entity cache.
    pub fn task_parts(&mut self, node: NodeId, entity: EntityId) -> (&mut NodeState, &[EntityId]) {
        let state = self.nodes.entry((node, entity)).or_default();
        (state, &self.filtered)
    }

    /// Number of `(node, entity)` entries currently holding state.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop everything, including lifetime counters and the filter cache.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.completions.clear();
        self.filtered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_until_written() {
        let mut state = EntityState::new();
        let (n, e) = (NodeId(3), EntityId(1));
        assert_eq!(state.last_status(n, e), Status::Unknown);
        assert_eq!(state.set_last_status(n, e, Status::Running), Status::Unknown);
        assert_eq!(state.last_status(n, e), Status::Running);
        assert_eq!(state.last_status(n, EntityId(2)), Status::Unknown);
    }

    #[test]
    fn clearing_selection_does_not_create_entries() {
        let mut state = EntityState::new();
        state.set_selected(NodeId(0), EntityId(1), None);
        assert!(state.is_empty());

        state.set_selected(NodeId(0), EntityId(1), Some(2));
        assert_eq!(state.selected(NodeId(0), EntityId(1)), Some(2));
        state.set_selected(NodeId(0), EntityId(1), None);
        assert_eq!(state.selected(NodeId(0), EntityId(1)), None);
    }

    #[test]
    fn clear_node_keeps_completion_counters() {
        let mut state = EntityState::new();
        let (n, e) = (NodeId(1), EntityId(1));
        state.set_last_status(n, e, Status::Finished);
        state.bump_completions(n, e);
        state.clear_node(n, e);
        assert_eq!(state.last_status(n, e), Status::Unknown);
        assert_eq!(state.completions(n, e), 1);

        state.clear();
        assert_eq!(state.completions(n, e), 0);
    }
}
