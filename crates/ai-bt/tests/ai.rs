mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use ai_bt::{Ai, BehaviorTree, Condition, NodeId, NodeKind, TaskFault, TreeNode};
use ai_core::{EntityId, Status};
use ai_tools::{TraceLog, NODE_STATUS, TASK_FAULT, TRACE_LOG};

use common::{ai_for, calls, counted, counter, fixed, two_step, Npc};

fn guard_post(attacks: &Arc<std::sync::atomic::AtomicUsize>) -> TreeNode<Npc> {
    let combat = TreeNode::new("combat", "", NodeKind::Sequence).with_child(
        counted("Attack", Status::Finished, attacks).with_condition(Condition::has_enemies(1)),
    );
    TreeNode::priority_selector(vec![combat, TreeNode::idle(3000)])
}

#[test]
fn idle_runs_for_its_duration_when_no_enemies_are_around() {
    let attacks = counter();
    let mut ai = ai_for(guard_post(&attacks));

    for tick in 1..=30 {
        assert_eq!(ai.update(100), Status::Running, "tick {tick}");
    }
    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(ai.update(100), Status::Running, "idle re-arms");
    assert_eq!(calls(&attacks), 0);
    assert_eq!(ai.time_millis(), 3200);
}

#[test]
fn zero_idle_finishes_immediately() {
    let mut ai = ai_for(TreeNode::idle(0));
    assert_eq!(ai.update(16), Status::Finished);
}

#[test]
fn snapshot_renders_live_state() {
    let attacks = counter();
    let mut ai = ai_for(guard_post(&attacks));
    ai.update(100);

    let snapshot = ai.snapshot();
    assert_eq!(snapshot.entity, EntityId(1));
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.status, Status::Running);
    assert_eq!(
        snapshot.root.render(),
        "PrioritySelector [RUNNING]\n\
         \x20 combat [UNKNOWN]\n\
         \x20   Attack [UNKNOWN] if HasEnemies{1}\n\
         \x20 Idle{3000} [RUNNING]\n"
    );
    assert_eq!(snapshot.root.find_by_name("Idle{3000}").map(|n| n.id), Some(3));
}

#[test]
fn task_errors_become_exceptions() {
    let mut ai = ai_for(TreeNode::task_fn("Broken", |_| Err(TaskFault::msg("no path"))));
    assert_eq!(ai.update(16), Status::Exception);
    assert_eq!(ai.node_status(NodeId(0)), Status::Exception);
}

#[test]
fn task_panics_become_exceptions() {
    let after = counter();
    let mut ai = ai_for(TreeNode::parallel(vec![
        TreeNode::task_fn("Panics", |_| panic!("adapter blew up")),
        counted("After", Status::Finished, &after),
    ]));
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(calls(&after), 1, "siblings still run");

    let mut ai = ai_for(TreeNode::task_fn("Panics", |_| panic!("adapter blew up")));
    assert_eq!(ai.update(16), Status::Exception);
}

#[test]
fn update_advances_the_character_clock() {
    let npc = Npc::new(4);
    let tree = Arc::new(BehaviorTree::new("noop", fixed("A", Status::Finished)));
    let mut ai = Ai::new(Arc::clone(&npc), tree);
    ai.update(40);
    ai.update(60);
    assert_eq!(npc.updated_millis.load(Ordering::Relaxed), 100);
    assert_eq!(ai.time_millis(), 100);
    assert_eq!(ai.tick_count(), 2);
}

#[test]
fn paused_ai_skips_updates() {
    let runs = counter();
    let mut ai = ai_for(counted("A", Status::Finished, &runs));
    assert_eq!(ai.update(16), Status::Finished);

    ai.set_paused(true);
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(calls(&runs), 1);
    assert_eq!(ai.tick_count(), 1);

    ai.set_paused(false);
    ai.update(16);
    assert_eq!(calls(&runs), 2);
}

#[test]
fn rebinding_clears_previous_state() {
    let mut ai = ai_for(TreeNode::sequence(vec![two_step("Walk")]));
    assert_eq!(ai.update(16), Status::Running);
    assert_eq!(ai.selected_child(NodeId(0)), Some(0));

    ai.set_character(Npc::new(2));
    assert_eq!(ai.id(), EntityId(2));
    assert!(ai.entity_state().is_empty());
    assert_eq!(ai.tick_count(), 0);
    assert_eq!(ai.update(16), Status::Running, "starts from scratch");

    ai.set_behavior(Arc::new(BehaviorTree::new("other", fixed("Done", Status::Finished))));
    assert_eq!(ai.last_status(), Status::Unknown);
    assert_eq!(ai.update(16), Status::Finished);
}

#[test]
fn status_changes_are_traced() {
    let mut ai = ai_for(TreeNode::sequence(vec![fixed("A", Status::Finished)]));
    ai.blackboard_mut().set(TRACE_LOG, TraceLog::default());

    ai.update(16);
    let log = ai.blackboard().get(TRACE_LOG).unwrap();
    let events: Vec<(u64, u64)> = log.with_tag(NODE_STATUS).map(|e| (e.a, e.b)).collect();
    let finished = Status::Finished.code();
    let unknown = Status::Unknown.code();
    assert_eq!(events, vec![(1, finished), (1, unknown), (0, finished)]);
    assert!(log.events.iter().all(|e| e.entity == EntityId(1) && e.tick == 0));

    // The child was reset, so it changes again; the root does not.
    ai.update(16);
    assert_eq!(ai.blackboard().get(TRACE_LOG).unwrap().events.len(), 5);
}

#[test]
fn abandoned_branches_are_traced_back_to_unknown() {
    let mut ai = ai_for(TreeNode::priority_selector(vec![
        fixed("Flee", Status::CannotExecute),
        two_step("Patrol"),
    ]));
    ai.blackboard_mut().set(TRACE_LOG, TraceLog::default());

    assert_eq!(ai.update(16), Status::Running);
    let log = ai.blackboard().get(TRACE_LOG).unwrap();
    let changes: Vec<_> = log.status_changes().collect();
    assert_eq!(
        changes,
        vec![
            (0, 1, Status::CannotExecute),
            (0, 1, Status::Unknown),
            (0, 2, Status::Running),
            (0, 0, Status::Running),
        ]
    );

    assert_eq!(ai.update(16), Status::Finished);
    let log = ai.blackboard().get(TRACE_LOG).unwrap();
    let changes: Vec<_> = log.status_changes().skip(4).collect();
    assert_eq!(
        changes,
        vec![
            (1, 2, Status::Finished),
            (1, 2, Status::Unknown),
            (1, 0, Status::Finished),
        ]
    );
}

#[test]
fn faults_are_traced_next_to_the_status_change() {
    let mut ai = ai_for(TreeNode::sequence(vec![TreeNode::task_fn("Broken", |_| {
        Err(TaskFault::msg("no path"))
    })]));
    ai.blackboard_mut().set(TRACE_LOG, TraceLog::default());

    assert_eq!(ai.update(16), Status::Exception);
    let log = ai.blackboard().get(TRACE_LOG).unwrap();
    let faults: Vec<u64> = log.with_tag(TASK_FAULT).map(|e| e.a).collect();
    assert_eq!(faults, vec![1]);
    assert_eq!(
        log.status_changes().collect::<Vec<_>>(),
        vec![(0, 1, Status::Exception), (0, 0, Status::Exception)]
    );
}
