#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ai_bt::{Ai, BehaviorTree, TaskContext, TreeNode};
use ai_core::{Character, EntityId, Status};

#[derive(Debug, Default)]
pub struct Npc {
    id: u64,
    enemies: Mutex<Vec<EntityId>>,
    pub updated_millis: AtomicU64,
}

impl Npc {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            ..Self::default()
        })
    }

    pub fn with_enemies(id: u64, enemies: &[u64]) -> Arc<Self> {
        let npc = Self::new(id);
        npc.set_enemies(enemies);
        npc
    }

    pub fn set_enemies(&self, enemies: &[u64]) {
        *self.enemies.lock().unwrap() = enemies.iter().copied().map(EntityId).collect();
    }
}

impl Character for Npc {
    fn id(&self) -> EntityId {
        EntityId(self.id)
    }

    fn update(&self, delta_millis: u64) {
        self.updated_millis.fetch_add(delta_millis, Ordering::Relaxed);
    }

    fn enemies(&self) -> Vec<EntityId> {
        self.enemies.lock().unwrap().clone()
    }
}

/// A leaf that always reports `status`.
pub fn fixed(name: &str, status: Status) -> TreeNode<Npc> {
    TreeNode::task_fn(name, move |_| Ok(status))
}

/// A leaf that reports `status` and counts its invocations.
pub fn counted(name: &str, status: Status, calls: &Arc<AtomicUsize>) -> TreeNode<Npc> {
    let calls = Arc::clone(calls);
    TreeNode::task_fn(name, move |_| {
        calls.fetch_add(1, Ordering::Relaxed);
        Ok(status)
    })
}

/// `Running` on its first invocation, `Finished` when resumed.
pub fn two_step(name: &str) -> TreeNode<Npc> {
    TreeNode::task_fn(name, |ctx: &mut TaskContext<'_, Npc>| {
        Ok(if ctx.first_run {
            Status::Running
        } else {
            Status::Finished
        })
    })
}

/// A leaf that appends `index` to `log` and reports `status`.
pub fn logged(index: usize, status: Status, log: &Arc<Mutex<Vec<usize>>>) -> TreeNode<Npc> {
    let log = Arc::clone(log);
    TreeNode::task_fn(format!("Log{index}"), move |_| {
        log.lock().unwrap().push(index);
        Ok(status)
    })
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::Relaxed)
}

pub fn ai_for(root: TreeNode<Npc>) -> Ai<Npc> {
    Ai::new(Npc::new(1), Arc::new(BehaviorTree::new("test", root)))
}
