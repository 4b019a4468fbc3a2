#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use ai_bt::{Ai, BehaviorTree, TaskContext, TaskFault, TreeNode};
use ai_core::{Character, EntityId, Status};
use ai_zone::{Zone, ZoneConfig};

#[derive(Debug, Default)]
pub struct Villager {
    id: u64,
    pub busy: AtomicBool,
    pub ticks: AtomicU64,
}

impl Villager {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            ..Self::default()
        })
    }
}

impl Character for Villager {
    fn id(&self) -> EntityId {
        EntityId(self.id)
    }
}

/// Leaf that faults if the same villager is ever ticked on two threads at once.
pub fn exclusive_work() -> TreeNode<Villager> {
    TreeNode::task_fn("Work", |ctx: &mut TaskContext<'_, Villager>| {
        if ctx.character.busy.swap(true, Ordering::AcqRel) {
            return Err(TaskFault::msg("entered twice"));
        }
        let mut acc = ctx.entity.0;
        for i in 0..200u64 {
            acc = acc.wrapping_mul(31).wrapping_add(i);
        }
        std::hint::black_box(acc);
        ctx.character.ticks.fetch_add(1, Ordering::Relaxed);
        ctx.character.busy.store(false, Ordering::Release);
        Ok(Status::Finished)
    })
}

pub fn work_tree() -> Arc<BehaviorTree<Villager>> {
    Arc::new(BehaviorTree::new("work", exclusive_work()))
}

pub fn villager_ai(id: u64, tree: &Arc<BehaviorTree<Villager>>) -> Ai<Villager> {
    Ai::new(Villager::new(id), Arc::clone(tree))
}

pub fn sequential(name: &str) -> Arc<Zone<Villager>> {
    let config = ZoneConfig {
        parallel: false,
        ..ZoneConfig::default()
    }
    .with_name(name);
    Zone::new(config).unwrap()
}

pub fn parallel(name: &str, workers: usize) -> Arc<Zone<Villager>> {
    let config = ZoneConfig {
        worker_threads: workers,
        min_shard_len: 1,
        ..ZoneConfig::default()
    }
    .with_name(name);
    Zone::new(config).unwrap()
}
