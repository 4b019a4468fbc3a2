//! Owned, mutable tree nodes used while a behavior is being assembled.
//!
//! Once complete, a `TreeNode` hierarchy is frozen into a [`crate::BehaviorTree`].

use ai_core::{Character, Status};

use crate::condition::Condition;
use crate::task::{FnTask, Task, TaskContext, TaskFault};

pub enum NodeKind<C: Character> {
    /// Runs children in order until one is not successful.
    Sequence,
    /// Runs the first child that can execute, resuming a running one.
    PrioritySelector,
    /// Picks one child by weight; missing weights count as `1.0`.
    ProbabilitySelector { weights: Vec<f32> },
    /// Runs every child in a freshly shuffled order.
    RandomSelector,
    /// Runs every child each tick.
    Parallel,
    Invert,
    /// Reports `Finished` for any terminal child result.
    Succeed,
    /// Reports `Failed` for any terminal child result.
    Fail,
    /// Lets the child complete at most `amount` times per entity.
    Limit { amount: u32 },
    Task(Box<dyn Task<C>>),
}

impl<C: Character> NodeKind<C> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Task(_))
    }

    pub fn is_decorator(&self) -> bool {
        matches!(
            self,
            NodeKind::Invert | NodeKind::Succeed | NodeKind::Fail | NodeKind::Limit { .. }
        )
    }
}

pub struct TreeNode<C: Character> {
    name: String,
    parameters: String,
    condition: Condition<C>,
    kind: NodeKind<C>,
    children: Vec<TreeNode<C>>,
}

impl<C: Character> TreeNode<C> {
    pub fn new(name: impl Into<String>, parameters: impl Into<String>, kind: NodeKind<C>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            condition: Condition::always(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn sequence(children: Vec<TreeNode<C>>) -> Self {
        Self::new("Sequence", "", NodeKind::Sequence).with_children(children)
    }

    pub fn priority_selector(children: Vec<TreeNode<C>>) -> Self {
        Self::new("PrioritySelector", "", NodeKind::PrioritySelector).with_children(children)
    }

    pub fn random_selector(children: Vec<TreeNode<C>>) -> Self {
        Self::new("RandomSelector", "", NodeKind::RandomSelector).with_children(children)
    }

    pub fn parallel(children: Vec<TreeNode<C>>) -> Self {
        Self::new("Parallel", "", NodeKind::Parallel).with_children(children)
    }

    pub fn probability_selector(weights: Vec<f32>, children: Vec<TreeNode<C>>) -> Self {
        let parameters = weights
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(
            "ProbabilitySelector",
            parameters,
            NodeKind::ProbabilitySelector { weights },
        )
        .with_children(children)
    }

    pub fn invert(child: TreeNode<C>) -> Self {
        Self::new("Invert", "", NodeKind::Invert).with_child(child)
    }

    pub fn succeed(child: TreeNode<C>) -> Self {
        Self::new("Succeed", "", NodeKind::Succeed).with_child(child)
    }

    pub fn fail(child: TreeNode<C>) -> Self {
        Self::new("Fail", "", NodeKind::Fail).with_child(child)
    }

    pub fn limit(amount: u32, child: TreeNode<C>) -> Self {
        Self::new("Limit", amount.to_string(), NodeKind::Limit { amount }).with_child(child)
    }

    pub fn task(
        name: impl Into<String>,
        parameters: impl Into<String>,
        task: impl Task<C>,
    ) -> Self {
        Self::new(name, parameters, NodeKind::Task(Box::new(task)))
    }

    pub fn task_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut TaskContext<'_, C>) -> Result<Status, TaskFault> + Send + Sync + 'static,
    {
        Self::task(name, "", FnTask(f))
    }

    pub fn idle(millis: u64) -> Self {
        Self::task("Idle", millis.to_string(), crate::task::Idle::new(millis))
    }

    pub fn print(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::task("Print", text.clone(), crate::task::Print::new(text))
    }

    pub fn with_condition(mut self, condition: Condition<C>) -> Self {
        self.condition = condition;
        self
    }

    pub fn set_condition(&mut self, condition: Condition<C>) {
        self.condition = condition;
    }

    /// Appends a child. Leaves never accept children and decorators accept one.
    pub fn add_child(&mut self, child: TreeNode<C>) -> bool {
        if self.kind.is_leaf() || (self.kind.is_decorator() && !self.children.is_empty()) {
            return false;
        }
        self.children.push(child);
        true
    }

    pub fn with_child(mut self, child: TreeNode<C>) -> Self {
        let child_name = child.name_with_parameters();
        if !self.add_child(child) {
            tracing::warn!(parent = %self.name, child = %child_name, "child rejected");
        }
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode<C>>) -> Self {
        for child in children {
            self = self.with_child(child);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    /// `Name{params}`, or just `Name` without parameters.
    pub fn name_with_parameters(&self) -> String {
        if self.parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}{{{}}}", self.name, self.parameters)
        }
    }

    pub fn condition(&self) -> &Condition<C> {
        &self.condition
    }

    pub fn children(&self) -> &[TreeNode<C>] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind<C> {
        &self.kind
    }

    /// Total node count of this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    pub(crate) fn into_parts(self) -> (String, String, Condition<C>, NodeKind<C>, Vec<TreeNode<C>>) {
        (self.name, self.parameters, self.condition, self.kind, self.children)
    }
}

impl<C: Character> std::fmt::Debug for TreeNode<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("name", &self.name_with_parameters())
            .field("condition", &self.condition)
            .field("children", &self.children)
            .finish()
    }
}
