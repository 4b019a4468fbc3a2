//! Behavior tree interpreter built on `ai-core`.
//!
//! A [`TreeNode`] hierarchy is built once (usually through an [`AiRegistry`]),
//! frozen into a shareable [`BehaviorTree`], and executed by any number of
//! [`Ai`] instances. Nodes carry no mutable state: every status, selector index
//! and timer lives in the executing AI's [`EntityState`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod ai;
pub mod condition;
pub mod filter;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod state;
pub mod task;
pub mod tree;

pub use ai::Ai;
pub use condition::{Condition, ConditionContext, ConditionKind, Predicate};
pub use filter::{EntitySelector, Filter, FilterKind};
pub use node::{NodeKind, TreeNode};
pub use registry::{
    AiRegistry, ConditionFactoryContext, FilterFactoryContext, NodeFactoryContext, RegistryError,
};
pub use state::{EntityState, NodeState};
pub use task::{Idle, Print, Task, TaskContext, TaskFault};
pub use tree::{BehaviorTree, ExecContext, NodeId};
