//! Entity filters used by the `Filter` condition.
//!
//! A filter appends the entities it selects to an output list. Wrapping filters
//! (`First`, `Union`, ...) run their children into scratch lists and combine them.

use ai_core::rng::mix64;
use ai_core::{Character, DeterministicRng, EntityId};

use crate::condition::ConditionContext;

/// Game-specific entity selection plugged in as a custom filter.
pub trait EntitySelector<C: Character>: Send + Sync + 'static {
    fn select(&self, ctx: &ConditionContext<'_, C>, out: &mut Vec<EntityId>);
}

struct FnSelector<F>(F);

impl<C, F> EntitySelector<C> for FnSelector<F>
where
    C: Character,
    F: Fn(&ConditionContext<'_, C>, &mut Vec<EntityId>) + Send + Sync + 'static,
{
    fn select(&self, ctx: &ConditionContext<'_, C>, out: &mut Vec<EntityId>) {
        (self.0)(ctx, out)
    }
}

pub enum FilterKind<C: Character> {
    /// Clears everything selected so far.
    SelectEmpty,
    /// Every other entity in the zone.
    SelectAll,
    /// The enemy with the highest aggro, if any.
    SelectHighestAggro,
    First(Box<Filter<C>>),
    Last(Box<Filter<C>>),
    Random {
        amount: usize,
        inner: Box<Filter<C>>,
    },
    Union(Vec<Filter<C>>),
    Intersection(Vec<Filter<C>>),
    /// Entities of the first child not selected by any later child.
    Difference(Vec<Filter<C>>),
    Custom(Box<dyn EntitySelector<C>>),
}

pub struct Filter<C: Character> {
    name: String,
    parameters: String,
    kind: FilterKind<C>,
}

impl<C: Character> Filter<C> {
    pub fn new(name: impl Into<String>, parameters: impl Into<String>, kind: FilterKind<C>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            kind,
        }
    }

    pub fn select_empty() -> Self {
        Self::new("SelectEmpty", "", FilterKind::SelectEmpty)
    }

    pub fn select_all() -> Self {
        Self::new("SelectAll", "", FilterKind::SelectAll)
    }

    pub fn select_highest_aggro() -> Self {
        Self::new("SelectHighestAggro", "", FilterKind::SelectHighestAggro)
    }

    pub fn first(inner: Filter<C>) -> Self {
        Self::new("First", "", FilterKind::First(Box::new(inner)))
    }

    pub fn last(inner: Filter<C>) -> Self {
        Self::new("Last", "", FilterKind::Last(Box::new(inner)))
    }

    pub fn random(amount: usize, inner: Filter<C>) -> Self {
        Self::new(
            "Random",
            amount.to_string(),
            FilterKind::Random {
                amount,
                inner: Box::new(inner),
            },
        )
    }

    pub fn union(children: Vec<Filter<C>>) -> Self {
        Self::new("Union", "", FilterKind::Union(children))
    }

    pub fn intersection(children: Vec<Filter<C>>) -> Self {
        Self::new("Intersection", "", FilterKind::Intersection(children))
    }

    pub fn difference(children: Vec<Filter<C>>) -> Self {
        Self::new("Difference", "", FilterKind::Difference(children))
    }

    pub fn custom(
        name: impl Into<String>,
        parameters: impl Into<String>,
        selector: impl EntitySelector<C>,
    ) -> Self {
        Self::new(name, parameters, FilterKind::Custom(Box::new(selector)))
    }

    pub fn from_fn<F>(name: impl Into<String>, parameters: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ConditionContext<'_, C>, &mut Vec<EntityId>) + Send + Sync + 'static,
    {
        Self::custom(name, parameters, FnSelector(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    pub fn name_with_parameters(&self) -> String {
        let mut out = self.name.clone();
        if !self.parameters.is_empty() {
            out.push('{');
            out.push_str(&self.parameters);
            out.push('}');
        }
        let children: Vec<&Filter<C>> = match &self.kind {
            FilterKind::First(f) | FilterKind::Last(f) => vec![f.as_ref()],
            FilterKind::Random { inner, .. } => vec![inner.as_ref()],
            FilterKind::Union(c) | FilterKind::Intersection(c) | FilterKind::Difference(c) => {
                c.iter().collect()
            }
            _ => Vec::new(),
        };
        if !children.is_empty() {
            let rendered: Vec<String> = children.iter().map(|f| f.name_with_parameters()).collect();
            out.push('(');
            out.push_str(&rendered.join(","));
            out.push(')');
        }
        out
    }

    pub fn apply(&self, ctx: &ConditionContext<'_, C>, out: &mut Vec<EntityId>) {
        match &self.kind {
            FilterKind::SelectEmpty => out.clear(),
            FilterKind::SelectAll => {
                if let Some(zone) = ctx.zone {
                    out.extend(zone.entities().into_iter().filter(|e| *e != ctx.entity));
                }
            }
            FilterKind::SelectHighestAggro => {
                if let Some(first) = ctx.character.enemies().first() {
                    out.push(*first);
                }
            }
            FilterKind::First(inner) => {
                if let Some(e) = run(inner, ctx).first() {
                    out.push(*e);
                }
            }
            FilterKind::Last(inner) => {
                if let Some(e) = run(inner, ctx).last() {
                    out.push(*e);
                }
            }
            FilterKind::Random { amount, inner } => {
                let mut selected = run(inner, ctx);
                let stream = mix64(0x5E1E_C7ED ^ *amount as u64);
                ctx.tick
                    .rng_for_entity(ctx.entity, stream)
                    .shuffle(&mut selected);
                selected.truncate(*amount);
                out.extend(selected);
            }
            FilterKind::Union(children) => {
                let mut merged: Vec<EntityId> = Vec::new();
                for child in children {
                    for e in run(child, ctx) {
                        if !merged.contains(&e) {
                            merged.push(e);
                        }
                    }
                }
                out.extend(merged);
            }
            FilterKind::Intersection(children) => {
                let Some((head, rest)) = children.split_first() else {
                    return;
                };
                let mut common = dedup(run(head, ctx));
                for child in rest {
                    let other = run(child, ctx);
                    common.retain(|e| other.contains(e));
                }
                out.extend(common);
            }
            FilterKind::Difference(children) => {
                let Some((head, rest)) = children.split_first() else {
                    return;
                };
                let mut remaining = dedup(run(head, ctx));
                for child in rest {
                    let other = run(child, ctx);
                    remaining.retain(|e| !other.contains(e));
                }
                out.extend(remaining);
            }
            FilterKind::Custom(selector) => selector.select(ctx, out),
        }
    }
}

fn run<C: Character>(filter: &Filter<C>, ctx: &ConditionContext<'_, C>) -> Vec<EntityId> {
    let mut scratch = Vec::new();
    filter.apply(ctx, &mut scratch);
    scratch
}

fn dedup(mut entities: Vec<EntityId>) -> Vec<EntityId> {
    let mut seen = Vec::with_capacity(entities.len());
    entities.retain(|e| {
        if seen.contains(e) {
            false
        } else {
            seen.push(*e);
            true
        }
    });
    entities
}

impl<C: Character> std::fmt::Debug for Filter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name_with_parameters())
    }
}
