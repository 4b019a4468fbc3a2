mod common;

use ai_bt::{NodeId, TreeNode};
use ai_core::Status;

use common::{ai_for, calls, counted, counter, fixed, two_step};

#[test]
fn invert_swaps_finished_and_failed() {
    assert_eq!(ai_for(TreeNode::invert(fixed("A", Status::Finished))).update(16), Status::Failed);
    assert_eq!(ai_for(TreeNode::invert(fixed("A", Status::Failed))).update(16), Status::Finished);
    assert_eq!(ai_for(TreeNode::invert(fixed("A", Status::Running))).update(16), Status::Running);
}

#[test]
fn succeed_and_fail_pass_running_through() {
    assert_eq!(ai_for(TreeNode::succeed(fixed("A", Status::Failed))).update(16), Status::Finished);
    assert_eq!(ai_for(TreeNode::succeed(fixed("A", Status::Running))).update(16), Status::Running);
    assert_eq!(ai_for(TreeNode::fail(fixed("A", Status::Finished))).update(16), Status::Failed);
    assert_eq!(ai_for(TreeNode::fail(fixed("A", Status::Running))).update(16), Status::Running);
}

#[test]
fn decorators_take_a_single_child() {
    let mut node = TreeNode::invert(fixed("A", Status::Finished));
    assert!(!node.add_child(fixed("B", Status::Finished)));
    assert_eq!(node.children().len(), 1);

    let mut leaf = fixed("Leaf", Status::Finished);
    assert!(!leaf.add_child(fixed("B", Status::Finished)));

    let mut bare = TreeNode::new("Invert", "", ai_bt::NodeKind::Invert);
    assert!(bare.add_child(fixed("A", Status::Finished)));
}

#[test]
fn childless_decorator_fails() {
    let bare = TreeNode::new("Fail", "", ai_bt::NodeKind::Fail);
    assert_eq!(ai_for(bare).update(16), Status::Failed);
}

#[test]
fn limit_caps_completions_across_resets() {
    let runs = counter();
    let mut ai = ai_for(TreeNode::sequence(vec![TreeNode::limit(
        2,
        counted("Shout", Status::Finished, &runs),
    )]));

    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(ai.update(16), Status::Failed);
    assert_eq!(ai.update(16), Status::Failed);
    assert_eq!(calls(&runs), 2);

    ai.reset_state();
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(calls(&runs), 3);
}

#[test]
fn limit_does_not_count_running_ticks() {
    let mut ai = ai_for(TreeNode::limit(1, two_step("Walk")));
    assert_eq!(ai.update(16), Status::Running);
    assert_eq!(ai.update(16), Status::Finished);
    assert_eq!(ai.update(16), Status::Failed);
    assert_eq!(ai.node_status(NodeId(1)), Status::Finished);
}
