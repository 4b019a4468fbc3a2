//! Named factories for nodes, conditions and filters.
//!
//! A tree loader only deals in type names and textual parameters; the registry
//! turns those into live objects. Registries are plain values: build one, hand
//! it to the loader, and drop it when done.

use std::collections::BTreeMap;
use std::str::FromStr;

use ai_core::Character;
use thiserror::Error;

use crate::condition::Condition;
use crate::filter::Filter;
use crate::node::{NodeKind, TreeNode};
use crate::task::{Idle, Print, Task};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown {kind} type `{name}`")]
    UnknownType { kind: &'static str, name: String },

    #[error("`{name}` expects {expected} children, got {actual}")]
    InvalidArity {
        name: String,
        expected: &'static str,
        actual: usize,
    },

    #[error("`{name}` has invalid parameter `{value}`")]
    InvalidParameter { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

pub struct NodeFactoryContext<C: Character> {
    /// Display name of the node; may differ from its type name.
    pub name: String,
    pub parameters: String,
    pub condition: Option<Condition<C>>,
}

impl<C: Character> NodeFactoryContext<C> {
    pub fn new(name: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition<C>) -> Self {
        self.condition = Some(condition);
        self
    }

    fn build(self, kind: NodeKind<C>) -> TreeNode<C> {
        TreeNode::new(self.name, self.parameters, kind)
            .with_condition(self.condition.unwrap_or_default())
    }
}

pub struct ConditionFactoryContext<C: Character> {
    pub parameters: String,
    pub conditions: Vec<Condition<C>>,
    pub filters: Vec<Filter<C>>,
}

impl<C: Character> ConditionFactoryContext<C> {
    pub fn new(parameters: impl Into<String>) -> Self {
        Self {
            parameters: parameters.into(),
            conditions: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition<C>>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter<C>>) -> Self {
        self.filters = filters;
        self
    }
}

pub struct FilterFactoryContext<C: Character> {
    pub parameters: String,
    pub filters: Vec<Filter<C>>,
}

impl<C: Character> FilterFactoryContext<C> {
    pub fn new(parameters: impl Into<String>) -> Self {
        Self {
            parameters: parameters.into(),
            filters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter<C>>) -> Self {
        self.filters = filters;
        self
    }
}

type NodeFactory<C> = Box<dyn Fn(NodeFactoryContext<C>) -> Result<TreeNode<C>> + Send + Sync>;
type ConditionFactory<C> =
    Box<dyn Fn(ConditionFactoryContext<C>) -> Result<Condition<C>> + Send + Sync>;
type FilterFactory<C> = Box<dyn Fn(FilterFactoryContext<C>) -> Result<Filter<C>> + Send + Sync>;

pub struct AiRegistry<C: Character> {
    nodes: BTreeMap<String, NodeFactory<C>>,
    conditions: BTreeMap<String, ConditionFactory<C>>,
    filters: BTreeMap<String, FilterFactory<C>>,
}

impl<C: Character> Default for AiRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Character> AiRegistry<C> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            conditions: BTreeMap::new(),
            filters: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in node, condition and filter type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_default_nodes();
        registry.register_default_conditions();
        registry.register_default_filters();
        registry
    }

    // --- nodes -----------------------------------------------------------

    pub fn register_node_factory<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(NodeFactoryContext<C>) -> Result<TreeNode<C>> + Send + Sync + 'static,
    {
        insert_new(&mut self.nodes, type_name.into(), Box::new(factory))
    }

    /// Registers a leaf type built from its parameter string.
    pub fn register_task<T, F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        T: Task<C>,
        F: Fn(&str) -> Result<T> + Send + Sync + 'static,
    {
        self.register_node_factory(type_name, move |ctx: NodeFactoryContext<C>| {
            let task = factory(&ctx.parameters)?;
            Ok(ctx.build(NodeKind::Task(Box::new(task))))
        })
    }

    pub fn unregister_node_factory(&mut self, type_name: &str) -> bool {
        self.nodes.remove(type_name).is_some()
    }

    pub fn has_node_factory(&self, type_name: &str) -> bool {
        self.nodes.contains_key(type_name)
    }

    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn create_node(&self, type_name: &str, ctx: NodeFactoryContext<C>) -> Result<TreeNode<C>> {
        let factory = self
            .nodes
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                kind: "node",
                name: type_name.to_string(),
            })?;
        factory(ctx)
    }

    // --- conditions --------------------------------------------------------

    pub fn register_condition_factory<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(ConditionFactoryContext<C>) -> Result<Condition<C>> + Send + Sync + 'static,
    {
        insert_new(&mut self.conditions, type_name.into(), Box::new(factory))
    }

    pub fn unregister_condition_factory(&mut self, type_name: &str) -> bool {
        self.conditions.remove(type_name).is_some()
    }

    pub fn has_condition_factory(&self, type_name: &str) -> bool {
        self.conditions.contains_key(type_name)
    }

    pub fn condition_types(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn create_condition(
        &self,
        type_name: &str,
        ctx: ConditionFactoryContext<C>,
    ) -> Result<Condition<C>> {
        let factory = self
            .conditions
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                kind: "condition",
                name: type_name.to_string(),
            })?;
        factory(ctx)
    }

    // --- filters -----------------------------------------------------------

    pub fn register_filter_factory<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(FilterFactoryContext<C>) -> Result<Filter<C>> + Send + Sync + 'static,
    {
        insert_new(&mut self.filters, type_name.into(), Box::new(factory))
    }

    pub fn unregister_filter_factory(&mut self, type_name: &str) -> bool {
        self.filters.remove(type_name).is_some()
    }

    pub fn has_filter_factory(&self, type_name: &str) -> bool {
        self.filters.contains_key(type_name)
    }

    pub fn filter_types(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn create_filter(&self, type_name: &str, ctx: FilterFactoryContext<C>) -> Result<Filter<C>> {
        let factory = self
            .filters
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                kind: "filter",
                name: type_name.to_string(),
            })?;
        factory(ctx)
    }

    // --- built-ins -----------------------------------------------------------

    fn register_default_nodes(&mut self) {
        self.register_node_factory("Sequence", |ctx| Ok(ctx.build(NodeKind::Sequence)));
        self.register_node_factory("PrioritySelector", |ctx| {
            Ok(ctx.build(NodeKind::PrioritySelector))
        });
        self.register_node_factory("RandomSelector", |ctx| Ok(ctx.build(NodeKind::RandomSelector)));
        self.register_node_factory("Parallel", |ctx| Ok(ctx.build(NodeKind::Parallel)));
        self.register_node_factory("ProbabilitySelector", |ctx| {
            let weights = parse_list::<f32>(&ctx.name, &ctx.parameters)?;
            Ok(ctx.build(NodeKind::ProbabilitySelector { weights }))
        });
        self.register_node_factory("Invert", |ctx| Ok(ctx.build(NodeKind::Invert)));
        self.register_node_factory("Succeed", |ctx| Ok(ctx.build(NodeKind::Succeed)));
        self.register_node_factory("Fail", |ctx| Ok(ctx.build(NodeKind::Fail)));
        self.register_node_factory("Limit", |ctx| {
            let amount = parse_required::<u32>(&ctx.name, &ctx.parameters)?;
            Ok(ctx.build(NodeKind::Limit { amount }))
        });
        self.register_task("Idle", |params| {
            Ok(Idle::new(parse_required::<u64>("Idle", params)?))
        });
        self.register_task("Print", |params| Ok(Print::new(params)));
    }

    fn register_default_conditions(&mut self) {
        self.register_condition_factory("True", |ctx| {
            expect_none("True", ctx.conditions.len())?;
            Ok(Condition::always())
        });
        self.register_condition_factory("False", |ctx| {
            expect_none("False", ctx.conditions.len())?;
            Ok(Condition::never())
        });
        self.register_condition_factory("And", |ctx| {
            let actual = ctx.conditions.len();
            Condition::and(ctx.conditions).ok_or(RegistryError::InvalidArity {
                name: "And".to_string(),
                expected: "at least 2",
                actual,
            })
        });
        self.register_condition_factory("Or", |ctx| {
            let actual = ctx.conditions.len();
            Condition::or(ctx.conditions).ok_or(RegistryError::InvalidArity {
                name: "Or".to_string(),
                expected: "at least 2",
                actual,
            })
        });
        self.register_condition_factory("Not", |ctx| {
            let actual = ctx.conditions.len();
            let mut conditions = ctx.conditions.into_iter();
            match (conditions.next(), actual) {
                (Some(child), 1) => Ok(Condition::not(child)),
                _ => Err(RegistryError::InvalidArity {
                    name: "Not".to_string(),
                    expected: "exactly 1",
                    actual,
                }),
            }
        });
        self.register_condition_factory("HasEnemies", |ctx| {
            let count = parse_optional::<usize>("HasEnemies", &ctx.parameters)?.unwrap_or(1);
            Ok(Condition::has_enemies(count))
        });
        self.register_condition_factory("Filter", |ctx| {
            if ctx.filters.is_empty() {
                return Err(RegistryError::InvalidArity {
                    name: "Filter".to_string(),
                    expected: "at least 1",
                    actual: 0,
                });
            }
            Ok(Condition::filter(ctx.filters))
        });
    }

    fn register_default_filters(&mut self) {
        self.register_filter_factory("SelectEmpty", |_| Ok(Filter::select_empty()));
        self.register_filter_factory("SelectAll", |_| Ok(Filter::select_all()));
        self.register_filter_factory("SelectHighestAggro", |_| Ok(Filter::select_highest_aggro()));
        self.register_filter_factory("First", |ctx| {
            Ok(Filter::first(single("First", ctx.filters)?))
        });
        self.register_filter_factory("Last", |ctx| Ok(Filter::last(single("Last", ctx.filters)?)));
        self.register_filter_factory("Random", |ctx| {
            let amount = parse_required::<usize>("Random", &ctx.parameters)?;
            Ok(Filter::random(amount, single("Random", ctx.filters)?))
        });
        self.register_filter_factory("Union", |ctx| {
            Ok(Filter::union(at_least_one("Union", ctx.filters)?))
        });
        self.register_filter_factory("Intersection", |ctx| {
            Ok(Filter::intersection(at_least_one("Intersection", ctx.filters)?))
        });
        self.register_filter_factory("Difference", |ctx| {
            Ok(Filter::difference(at_least_one("Difference", ctx.filters)?))
        });
    }
}

fn insert_new<V>(map: &mut BTreeMap<String, V>, key: String, value: V) -> bool {
    if map.contains_key(&key) {
        return false;
    }
    map.insert(key, value);
    true
}

fn parse_optional<T: FromStr>(name: &str, parameters: &str) -> Result<Option<T>> {
    let trimmed = parameters.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| RegistryError::InvalidParameter {
            name: name.to_string(),
            value: parameters.to_string(),
        })
}

fn parse_required<T: FromStr>(name: &str, parameters: &str) -> Result<T> {
    parse_optional(name, parameters)?.ok_or_else(|| RegistryError::InvalidParameter {
        name: name.to_string(),
        value: parameters.to_string(),
    })
}

fn parse_list<T: FromStr>(name: &str, parameters: &str) -> Result<Vec<T>> {
    if parameters.trim().is_empty() {
        return Ok(Vec::new());
    }
    parameters
        .split(',')
        .map(|item| parse_required(name, item))
        .collect()
}

fn expect_none(name: &str, actual: usize) -> Result<()> {
    if actual == 0 {
        return Ok(());
    }
    Err(RegistryError::InvalidArity {
        name: name.to_string(),
        expected: "no",
        actual,
    })
}

fn single<C: Character>(name: &str, mut filters: Vec<Filter<C>>) -> Result<Filter<C>> {
    if filters.len() != 1 {
        return Err(RegistryError::InvalidArity {
            name: name.to_string(),
            expected: "exactly 1",
            actual: filters.len(),
        });
    }
    filters.pop().ok_or_else(|| RegistryError::InvalidArity {
        name: name.to_string(),
        expected: "exactly 1",
        actual: 0,
    })
}

fn at_least_one<C: Character>(name: &str, filters: Vec<Filter<C>>) -> Result<Vec<Filter<C>>> {
    if filters.is_empty() {
        return Err(RegistryError::InvalidArity {
            name: name.to_string(),
            expected: "at least 1",
            actual: 0,
        });
    }
    Ok(filters)
}
