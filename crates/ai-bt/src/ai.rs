//! The per-entity execution context.

use std::sync::{Arc, Weak};

use ai_core::{Blackboard, Character, EntityId, Status, TickContext, ZoneView};
use ai_tools::AiSnapshot;

use crate::state::EntityState;
use crate::tree::{BehaviorTree, ExecContext, NodeId};

const DEFAULT_SEED: u64 = 0x00A1_5EED;

/// Binds one character to one shared behavior tree.
///
/// All mutable execution state (statuses, selector memory, timers, the filter
/// cache) lives here, so an `Ai` must only ever be updated by one thread at a
/// time. `&mut self` on [`Ai::update`] makes that structural.
pub struct Ai<C: Character> {
    character: Arc<C>,
    behavior: Arc<BehaviorTree<C>>,
    zone: Option<Weak<dyn ZoneView>>,
    state: EntityState,
    blackboard: Blackboard,
    tick: u64,
    time_millis: u64,
    seed: u64,
    paused: bool,
    last_status: Status,
}

impl<C: Character> Ai<C> {
    pub fn new(character: Arc<C>, behavior: Arc<BehaviorTree<C>>) -> Self {
        Self {
            character,
            behavior,
            zone: None,
            state: EntityState::new(),
            blackboard: Blackboard::new(),
            tick: 0,
            time_millis: 0,
            seed: DEFAULT_SEED,
            paused: false,
            last_status: Status::Unknown,
        }
    }

    /// Seed for every random choice this AI makes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn id(&self) -> EntityId {
        self.character.id()
    }

    pub fn character(&self) -> &Arc<C> {
        &self.character
    }

    pub fn behavior(&self) -> &Arc<BehaviorTree<C>> {
        &self.behavior
    }

    /// Swaps the behavior. State recorded against the old tree is dropped.
    pub fn set_behavior(&mut self, behavior: Arc<BehaviorTree<C>>) {
        self.behavior = behavior;
        self.reset_state();
    }

    /// Rebinds to another character; nothing recorded for the previous one
    /// survives.
    pub fn set_character(&mut self, character: Arc<C>) {
        self.character = character;
        self.reset_state();
        self.tick = 0;
        self.time_millis = 0;
    }

    pub fn set_zone(&mut self, zone: Option<Weak<dyn ZoneView>>) {
        self.zone = zone;
    }

    pub fn zone(&self) -> Option<Arc<dyn ZoneView>> {
        self.zone.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances the simulation clock by `delta_millis` and executes the tree
    /// once. A paused AI does nothing and reports its previous status.
    pub fn update(&mut self, delta_millis: u64) -> Status {
        if self.paused {
            return self.last_status;
        }

        self.time_millis = self.time_millis.saturating_add(delta_millis);
        self.character.update(delta_millis);

        let tick = TickContext::new(self.tick, delta_millis, self.time_millis, self.seed);
        let zone = self.zone();
        let mut ctx = ExecContext::new(
            self.character.as_ref(),
            &tick,
            &mut self.state,
            &mut self.blackboard,
        )
        .with_zone(zone.as_deref());
        let status = self.behavior.execute(self.behavior.root(), &mut ctx);

        self.tick += 1;
        self.last_status = status;
        status
    }

    /// Forgets every status, selection, timer and counter of this entity.
    pub fn reset_state(&mut self) {
        self.state.clear();
        self.last_status = Status::Unknown;
    }

    pub fn last_status(&self) -> Status {
        self.last_status
    }

    pub fn node_status(&self, node: NodeId) -> Status {
        self.state.last_status(node, self.id())
    }

    pub fn selected_child(&self, node: NodeId) -> Option<usize> {
        self.state.selected(node, self.id())
    }

    pub fn filtered_entities(&self) -> &[EntityId] {
        self.state.filtered()
    }

    pub fn entity_state(&self) -> &EntityState {
        &self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn time_millis(&self) -> u64 {
        self.time_millis
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn snapshot(&self) -> AiSnapshot {
        let entity = self.id();
        AiSnapshot {
            entity,
            tick: self.tick,
            time_millis: self.time_millis,
            status: self.last_status,
            paused: self.paused,
            root: self.behavior.snapshot(&self.state, entity),
        }
    }
}

impl<C: Character> std::fmt::Debug for Ai<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ai")
            .field("entity", &self.id())
            .field("behavior", &self.behavior.name())
            .field("tick", &self.tick)
            .field("paused", &self.paused)
            .field("last_status", &self.last_status)
            .finish()
    }
}
