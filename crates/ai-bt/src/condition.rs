//! Guarding conditions.
//!
//! A condition is a predicate over the executing entity. Composite conditions
//! (`And`, `Or`, `Not`, `Filter`) own their children exclusively, like tree nodes.

use std::fmt::Write as _;

use ai_core::{Blackboard, Character, EntityId, TickContext, ZoneView};

use crate::filter::Filter;

pub struct ConditionContext<'a, C: Character> {
    pub character: &'a C,
    pub entity: EntityId,
    pub zone: Option<&'a dyn ZoneView>,
    pub tick: &'a TickContext,
    /// The AI's filtered-entity cache; written by `Filter` conditions.
    pub filtered: &'a mut Vec<EntityId>,
    pub blackboard: &'a Blackboard,
}

/// Game-specific predicate plugged in as a custom condition.
pub trait Predicate<C: Character>: Send + Sync + 'static {
    fn evaluate(&self, ctx: &mut ConditionContext<'_, C>) -> bool;
}

struct FnPredicate<F>(F);

impl<C, F> Predicate<C> for FnPredicate<F>
where
    C: Character,
    F: Fn(&mut ConditionContext<'_, C>) -> bool + Send + Sync + 'static,
{
    fn evaluate(&self, ctx: &mut ConditionContext<'_, C>) -> bool {
        (self.0)(ctx)
    }
}

pub enum ConditionKind<C: Character> {
    True,
    False,
    And(Vec<Condition<C>>),
    Or(Vec<Condition<C>>),
    Not(Box<Condition<C>>),
    /// At least this many enemies.
    HasEnemies(usize),
    Filter(Vec<Filter<C>>),
    Custom(Box<dyn Predicate<C>>),
}

pub struct Condition<C: Character> {
    name: String,
    parameters: String,
    kind: ConditionKind<C>,
}

impl<C: Character> Condition<C> {
    pub fn new(name: impl Into<String>, parameters: impl Into<String>, kind: ConditionKind<C>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            kind,
        }
    }

    pub fn always() -> Self {
        Self::new("True", "", ConditionKind::True)
    }

    pub fn never() -> Self {
        Self::new("False", "", ConditionKind::False)
    }

    /// `None` unless at least two children are given.
    pub fn and(children: Vec<Condition<C>>) -> Option<Self> {
        if children.len() < 2 {
            return None;
        }
        Some(Self::new("And", "", ConditionKind::And(children)))
    }

    /// `None` unless at least two children are given.
    pub fn or(children: Vec<Condition<C>>) -> Option<Self> {
        if children.len() < 2 {
            return None;
        }
        Some(Self::new("Or", "", ConditionKind::Or(children)))
    }

    pub fn not(child: Condition<C>) -> Self {
        Self::new("Not", "", ConditionKind::Not(Box::new(child)))
    }

    pub fn has_enemies(count: usize) -> Self {
        Self::new("HasEnemies", count.to_string(), ConditionKind::HasEnemies(count))
    }

    pub fn filter(filters: Vec<Filter<C>>) -> Self {
        Self::new("Filter", "", ConditionKind::Filter(filters))
    }

    pub fn custom(
        name: impl Into<String>,
        parameters: impl Into<String>,
        predicate: impl Predicate<C>,
    ) -> Self {
        Self::new(name, parameters, ConditionKind::Custom(Box::new(predicate)))
    }

    pub fn from_fn<F>(name: impl Into<String>, parameters: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut ConditionContext<'_, C>) -> bool + Send + Sync + 'static,
    {
        Self::custom(name, parameters, FnPredicate(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    pub fn kind(&self) -> &ConditionKind<C> {
        &self.kind
    }

    pub fn is_always(&self) -> bool {
        matches!(self.kind, ConditionKind::True)
    }

    pub fn children(&self) -> &[Condition<C>] {
        match &self.kind {
            ConditionKind::And(c) | ConditionKind::Or(c) => c,
            ConditionKind::Not(c) => std::slice::from_ref(c.as_ref()),
            _ => &[],
        }
    }

    pub fn evaluate(&self, ctx: &mut ConditionContext<'_, C>) -> bool {
        match &self.kind {
            ConditionKind::True => true,
            ConditionKind::False => false,
            ConditionKind::And(children) => children.iter().all(|c| c.evaluate(ctx)),
            ConditionKind::Or(children) => children.iter().any(|c| c.evaluate(ctx)),
            ConditionKind::Not(child) => !child.evaluate(ctx),
            ConditionKind::HasEnemies(count) => ctx.character.enemies().len() >= *count,
            ConditionKind::Filter(filters) => {
                let mut out = std::mem::take(ctx.filtered);
                out.clear();
                for filter in filters {
                    filter.apply(ctx, &mut out);
                }
                let any = !out.is_empty();
                *ctx.filtered = out;
                any
            }
            ConditionKind::Custom(predicate) => predicate.evaluate(ctx),
        }
    }

    /// Diagnostic rendering: `Name{params}` for leaves, `Name(child,child)` for
    /// composites, children in their original order.
    pub fn name_with_conditions(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.name);
        match &self.kind {
            ConditionKind::And(children) | ConditionKind::Or(children) => {
                out.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    child.render_into(out);
                }
                out.push(')');
            }
            ConditionKind::Not(child) => {
                out.push('(');
                child.render_into(out);
                out.push(')');
            }
            ConditionKind::Filter(filters) => {
                out.push('(');
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&filter.name_with_parameters());
                }
                out.push(')');
            }
            _ => {
                if !self.parameters.is_empty() {
                    let _ = write!(out, "{{{}}}", self.parameters);
                }
            }
        }
    }
}

impl<C: Character> Default for Condition<C> {
    fn default() -> Self {
        Self::always()
    }
}

impl<C: Character> std::fmt::Debug for Condition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name_with_conditions())
    }
}
