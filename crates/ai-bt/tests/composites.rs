mod common;

use std::sync::{Arc, Mutex};

use ai_bt::{NodeId, TaskContext, TreeNode};
use ai_core::{EntityId, Status};

use common::{ai_for, calls, counted, counter, fixed, logged, two_step, Npc};

#[test]
fn sequence_failure_resets_every_child() {
    let mut ai = ai_for(TreeNode::sequence(vec![
        fixed("A", Status::Finished),
        fixed("B", Status::Failed),
        fixed("C", Status::Finished),
    ]));

    assert_eq!(ai.update(100), Status::Failed);
    for id in 1..=3 {
        assert_eq!(ai.node_status(NodeId(id)), Status::Unknown, "child {id}");
    }
    assert_eq!(ai.selected_child(NodeId(0)), None);
}

#[test]
fn sequence_resumes_at_the_running_child() {
    let first = counter();
    let last = counter();
    let mut ai = ai_for(TreeNode::sequence(vec![
        counted("A", Status::Finished, &first),
        two_step("B"),
        counted("C", Status::Finished, &last),
    ]));

    assert_eq!(ai.update(100), Status::Running);
    assert_eq!(ai.selected_child(NodeId(0)), Some(1));
    assert_eq!(calls(&first), 1);
    assert_eq!(calls(&last), 0);

    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(calls(&first), 1, "finished children are not re-run");
    assert_eq!(calls(&last), 1);
    assert_eq!(ai.selected_child(NodeId(0)), None);
}

#[test]
fn sequence_keeps_its_selection_on_exception() {
    let mut ai = ai_for(TreeNode::sequence(vec![
        fixed("A", Status::Finished),
        TreeNode::task_fn("Flaky", |ctx: &mut TaskContext<'_, Npc>| {
            if ctx.first_run {
                Ok(Status::Running)
            } else {
                Err(ai_bt::TaskFault::msg("lost target"))
            }
        }),
        fixed("C", Status::Finished),
    ]));

    assert_eq!(ai.update(100), Status::Running);
    assert_eq!(ai.update(100), Status::Exception);
    assert_eq!(ai.selected_child(NodeId(0)), Some(1));
    assert_eq!(ai.node_status(NodeId(2)), Status::Exception);
}

#[test]
fn empty_sequence_finishes() {
    let mut ai = ai_for(TreeNode::sequence(Vec::new()));
    assert_eq!(ai.update(16), Status::Finished);
}

#[test]
fn priority_selector_commits_to_the_running_child() {
    let low = counter();
    let mut ai = ai_for(TreeNode::priority_selector(vec![
        fixed("Blocked", Status::CannotExecute),
        fixed("Busy", Status::Running),
        counted("Fallback", Status::Finished, &low),
    ]));

    assert_eq!(ai.update(100), Status::Running);
    assert_eq!(ai.selected_child(NodeId(0)), Some(1));
    assert_eq!(ai.node_status(NodeId(1)), Status::Unknown);
    assert_eq!(ai.node_status(NodeId(2)), Status::Running);
    assert_eq!(ai.node_status(NodeId(3)), Status::Unknown);
    assert_eq!(calls(&low), 0);
}

#[test]
fn priority_selector_falls_back_past_failures() {
    let mut ai = ai_for(TreeNode::priority_selector(vec![
        fixed("A", Status::Failed),
        fixed("B", Status::CannotExecute),
        fixed("C", Status::Finished),
    ]));
    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(ai.selected_child(NodeId(0)), None);
    assert_eq!(ai.node_status(NodeId(3)), Status::Unknown);
}

#[test]
fn priority_selector_finishes_when_every_child_fails() {
    let mut ai = ai_for(TreeNode::priority_selector(vec![
        fixed("A", Status::Failed),
        fixed("B", Status::CannotExecute),
    ]));
    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(ai.selected_child(NodeId(0)), None);
}

#[test]
fn failing_fallbacks_do_not_abort_the_enclosing_sequence() {
    let after = counter();
    let mut ai = ai_for(TreeNode::sequence(vec![
        TreeNode::priority_selector(vec![
            fixed("A", Status::Failed),
            fixed("B", Status::CannotExecute),
        ]),
        counted("After", Status::Finished, &after),
    ]));
    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(calls(&after), 1);
}

#[test]
fn priority_selector_resets_skipped_children_when_resuming() {
    let mut ai = ai_for(TreeNode::priority_selector(vec![
        TreeNode::sequence(vec![two_step("Inner")]).with_condition(ai_bt::Condition::never()),
        two_step("Second"),
    ]));

    assert_eq!(ai.update(100), Status::Running);
    assert_eq!(ai.selected_child(NodeId(0)), Some(1));
    assert_eq!(ai.update(100), Status::Finished);
    for id in 0..4 {
        assert_ne!(ai.node_status(NodeId(id)), Status::Running, "node {id}");
    }
}

#[test]
fn parallel_runs_every_child_every_tick() {
    let (a, b, c) = (counter(), counter(), counter());
    let mut ai = ai_for(TreeNode::parallel(vec![
        counted("A", Status::Running, &a),
        counted("B", Status::Finished, &b),
        counted("C", Status::Running, &c),
    ]));

    assert_eq!(ai.update(100), Status::Running);
    assert_eq!(ai.update(100), Status::Running);
    assert_eq!((calls(&a), calls(&b), calls(&c)), (2, 2, 2));
    assert_eq!(ai.node_status(NodeId(2)), Status::Unknown);
}

#[test]
fn parallel_finishes_when_nothing_runs() {
    let mut ai = ai_for(TreeNode::parallel(vec![
        fixed("A", Status::Failed),
        fixed("B", Status::Finished),
    ]));
    assert_eq!(ai.update(100), Status::Finished);
    assert_eq!(ai.node_status(NodeId(1)), Status::Unknown);
}

#[test]
fn random_selector_picks_each_child_first_roughly_uniformly() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut ai = ai_for(TreeNode::random_selector(
        (0..3).map(|i| logged(i, Status::Finished, &log)).collect(),
    ));

    let mut first = [0usize; 3];
    for _ in 0..1000 {
        assert_eq!(ai.update(16), Status::Finished);
        let mut order = log.lock().unwrap();
        assert_eq!(order.len(), 3, "every child runs each tick");
        first[order[0]] += 1;
        order.clear();
    }

    for (child, count) in first.iter().enumerate() {
        assert!((200..470).contains(count), "child {child} first {count} times");
    }
}

#[test]
fn random_selector_reports_failures_but_keeps_scanning() {
    let ok = counter();
    let mut ai = ai_for(TreeNode::random_selector(vec![
        fixed("Broken", Status::Failed),
        counted("Ok", Status::Finished, &ok),
    ]));
    assert_eq!(ai.update(16), Status::Failed);
    assert_eq!(calls(&ok), 1);
}

#[test]
fn random_selector_leaves_running_children_running() {
    let mut ai = ai_for(TreeNode::random_selector(vec![
        fixed("Busy", Status::Running),
        fixed("Done", Status::Finished),
    ]));
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(ai.node_status(NodeId(1)), Status::Running);
    assert_eq!(ai.node_status(NodeId(2)), Status::Unknown);
}

#[test]
fn probability_selector_honours_zero_weights() {
    let (a, b) = (counter(), counter());
    let mut ai = ai_for(TreeNode::probability_selector(
        vec![0.0, 1.0],
        vec![
            counted("Never", Status::Finished, &a),
            counted("Always", Status::Finished, &b),
        ],
    ));
    for _ in 0..50 {
        assert_eq!(ai.update(16), Status::Finished);
    }
    assert_eq!((calls(&a), calls(&b)), (0, 50));
}

#[test]
fn probability_selector_resumes_its_running_choice() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pick = |i: usize| {
        let log = Arc::clone(&log);
        TreeNode::task_fn(format!("Pick{i}"), move |ctx: &mut TaskContext<'_, Npc>| {
            log.lock().unwrap().push(i);
            Ok(if ctx.first_run {
                Status::Running
            } else {
                Status::Finished
            })
        })
    };
    let mut ai = ai_for(TreeNode::probability_selector(
        vec![1.0, 1.0, 1.0],
        vec![pick(0), pick(1), pick(2)],
    ));

    assert_eq!(ai.update(16), Status::Running);
    assert_eq!(ai.update(16), Status::Finished);
    let order = log.lock().unwrap();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0], order[1]);
}

#[test]
fn probability_selector_without_children_fails() {
    let mut ai = ai_for(TreeNode::probability_selector(Vec::new(), Vec::new()));
    assert_eq!(ai.update(16), Status::Failed);
}

#[test]
fn reset_clears_every_descendant() {
    let mut ai = ai_for(TreeNode::parallel(vec![
        TreeNode::sequence(vec![fixed("A", Status::Finished), two_step("B")]),
        TreeNode::priority_selector(vec![fixed("C", Status::Running)]),
    ]));
    assert_eq!(ai.update(100), Status::Running);
    assert!(!ai.entity_state().is_empty());

    ai.reset_state();
    let len = ai.behavior().len() as u32;
    for id in 0..len {
        assert_eq!(ai.node_status(NodeId(id)), Status::Unknown, "node {id}");
        assert_eq!(ai.selected_child(NodeId(id)), None);
    }
    assert_eq!(ai.last_status(), Status::Unknown);
}

#[test]
fn subtree_reset_leaves_siblings_alone() {
    let mut ai = ai_for(TreeNode::parallel(vec![
        TreeNode::sequence(vec![fixed("A", Status::Running)]),
        fixed("B", Status::Running),
    ]));
    ai.update(100);

    let tree = Arc::clone(ai.behavior());
    let entity = EntityId(1);
    let mut state = ai_bt::EntityState::new();
    state.set_last_status(NodeId(1), entity, Status::Running);
    state.set_last_status(NodeId(2), entity, Status::Running);
    state.set_last_status(NodeId(3), entity, Status::Running);
    tree.reset_state(NodeId(1), &mut state, entity);

    assert_eq!(state.last_status(NodeId(1), entity), Status::Unknown);
    assert_eq!(state.last_status(NodeId(2), entity), Status::Unknown);
    assert_eq!(state.last_status(NodeId(3), entity), Status::Running);
}
