//! A small goblin camp: trees are assembled through the registry, ticked by a
//! scheduled zone, then inspected through snapshots and the trace log.
//!
//! Run with `RUST_LOG=debug cargo run -p ai --example zone_demo` for per-AI logs.

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai::bt::NodeId;
use ai::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

struct Goblin {
    id: u64,
    /// Goblins with an even id have spotted someone.
    hostile: bool,
    steps: AtomicUsize,
}

impl Character for Goblin {
    fn id(&self) -> EntityId {
        EntityId(self.id)
    }

    fn enemies(&self) -> Vec<EntityId> {
        if self.hostile {
            vec![EntityId(100)]
        } else {
            Vec::new()
        }
    }
}

fn node(
    registry: &AiRegistry<Goblin>,
    type_name: &str,
    parameters: &str,
    children: Vec<TreeNode<Goblin>>,
) -> Result<TreeNode<Goblin>, Box<dyn Error>> {
    let node = registry.create_node(type_name, NodeFactoryContext::new(type_name, parameters))?;
    Ok(node.with_children(children))
}

fn camp_tree(registry: &AiRegistry<Goblin>) -> Result<BehaviorTree<Goblin>, Box<dyn Error>> {
    let spotted = registry.create_condition("HasEnemies", ConditionFactoryContext::new("1"))?;
    let step = TreeNode::task_fn("Step", |ctx: &mut TaskContext<'_, Goblin>| {
        ctx.character.steps.fetch_add(1, Ordering::Relaxed);
        Ok(Status::Finished)
    });

    let fight = node(
        registry,
        "Sequence",
        "",
        vec![
            node(registry, "Print", "charging", vec![])?,
            node(registry, "Idle", "300", vec![])?,
        ],
    )?
    .with_condition(spotted);

    let wander = node(
        registry,
        "Sequence",
        "",
        vec![
            node(registry, "RandomSelector", "", vec![step])?,
            node(registry, "Idle", "200", vec![])?,
        ],
    )?;

    let root = node(registry, "PrioritySelector", "", vec![fight, wander])?;
    Ok(BehaviorTree::new("camp", root))
}

fn main() -> Result<(), Box<dyn Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let registry = AiRegistry::with_defaults();
    let tree = Arc::new(camp_tree(&registry)?);

    let config = ZoneConfig {
        tick_millis: 50,
        debug: true,
        seed: Some(7),
        ..ZoneConfig::default()
    }
    .with_name("camp");
    let zone: Arc<Zone<Goblin>> = Zone::new(config)?;

    for id in 0..8 {
        let goblin = Arc::new(Goblin {
            id,
            hostile: id % 2 == 0,
            steps: AtomicUsize::new(0),
        });
        zone.add(Ai::new(goblin, Arc::clone(&tree)))?;
    }
    zone.execute(EntityId(0), |ai| ai.blackboard_mut().set(TRACE_LOG, TraceLog::default()));

    let scheduler = Scheduler::new(2)?;
    zone.start(&scheduler)?;
    std::thread::sleep(Duration::from_secs(1));
    zone.stop();
    scheduler.shutdown();

    for snapshot in zone.snapshots() {
        println!(
            "{} tick={} status={}",
            snapshot.entity, snapshot.tick, snapshot.status
        );
        print!("{}", snapshot.root.render());
    }

    zone.for_each(|ai| {
        let steps = ai.character().steps.load(Ordering::Relaxed);
        if steps > 0 {
            println!("{} wandered {steps} steps", ai.id());
        }
    });

    zone.execute(EntityId(0), |ai| {
        if let Some(log) = ai.blackboard().get(TRACE_LOG) {
            for e in log.with_tag("bt.node.status") {
                let name = tree.name_of(NodeId(e.a as u32)).unwrap_or("?");
                println!("[tick={}] {name} -> {}", e.tick, Status::from_code(e.b));
            }
        }
    });
    Ok(())
}
