//! Read-only views of a behavior tree's live per-entity state.
//!
//! Snapshots are plain owned data: the runtime builds them between ticks and
//! hands them to debuggers, so rendering never has to touch the running AI.

use std::fmt::{self, Write as _};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ai_core::{EntityId, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeSnapshot {
    pub id: u32,
    /// Node name with parameters, e.g. `Idle{3000}`.
    pub name: String,
    /// Rendered guarding condition, e.g. `And(True,HasEnemies{1})`.
    pub condition: String,
    pub status: Status,
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Depth-first search by node id.
    pub fn find(&self, id: u32) -> Option<&NodeSnapshot> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// First node (pre-order) whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&NodeSnapshot> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_name(name))
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::count).sum::<usize>()
    }

    /// Indented multi-line rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = write!(out, "{} [{}]", self.name, self.status);
        if !self.condition.is_empty() && self.condition != "True" {
            let _ = write!(out, " if {}", self.condition);
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

impl fmt::Display for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AiSnapshot {
    pub entity: EntityId,
    pub tick: u64,
    pub time_millis: u64,
    pub status: Status,
    pub paused: bool,
    pub root: NodeSnapshot,
}
