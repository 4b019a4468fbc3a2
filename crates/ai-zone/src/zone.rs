//! Per-level container of AIs.
//!
//! Adds and removes are queued and applied at the start of the next round
//! under the round lock, so an AI is never dropped while a tick thread holds
//! it and never ticked after its removal was applied.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use ai_bt::Ai;
use ai_core::{Character, EntityId, ZoneView};
use ai_tools::AiSnapshot;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::collections::ConcurrentMap;
use crate::config::ZoneConfig;
use crate::error::{Result, ZoneError};
use crate::scheduler::{Scheduler, TaskHandle};

struct Pending<C: Character> {
    add: Vec<Ai<C>>,
    remove: BTreeSet<EntityId>,
}

impl<C: Character> Default for Pending<C> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            remove: BTreeSet::new(),
        }
    }
}

pub struct Zone<C: Character> {
    config: ZoneConfig,
    me: Weak<Zone<C>>,
    pool: Option<ThreadPool>,
    /// Round lock. Sorted by entity id.
    ais: Mutex<Vec<Ai<C>>>,
    pending: Mutex<Pending<C>>,
    /// Ids of the AIs in `ais`, readable while a round is in flight.
    members: RwLock<Vec<EntityId>>,
    debug: AtomicBool,
    snapshots: ConcurrentMap<EntityId, AiSnapshot>,
    ticker: Mutex<Option<Ticker>>,
}

/// A `start` registration. `live` is cleared by `stop` and checked under the
/// round lock, so no scheduled round begins once `stop` has returned.
struct Ticker {
    handle: TaskHandle,
    live: Arc<AtomicBool>,
}

impl Ticker {
    fn halt(&self) {
        self.handle.cancel();
        self.live.store(false, Ordering::Release);
    }
}

impl<C: Character> Zone<C> {
    pub fn new(config: ZoneConfig) -> Result<Arc<Self>> {
        let pool = if config.parallel {
            let name = config.name.clone();
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(config.worker_threads)
                    .thread_name(move |i| format!("zone-{name}-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        let debug = AtomicBool::new(config.debug);
        Ok(Arc::new_cyclic(|me| Self {
            config,
            me: me.clone(),
            pool,
            ais: Mutex::new(Vec::new()),
            pending: Mutex::new(Pending::default()),
            members: RwLock::new(Vec::new()),
            debug,
            snapshots: ConcurrentMap::new(),
            ticker: Mutex::new(None),
        }))
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Queues `ai` for the next round.
    pub fn add(&self, ai: Ai<C>) -> Result<()> {
        let id = ai.id();
        let mut pending = self.pending.lock();
        let present = self.members.read().binary_search(&id).is_ok() && !pending.remove.contains(&id);
        if present || pending.add.iter().any(|queued| queued.id() == id) {
            return Err(ZoneError::DuplicateEntity(id));
        }
        pending.add.push(ai);
        Ok(())
    }

    /// Queues removal of `id`. `false` if the entity is neither registered nor
    /// queued for addition.
    pub fn remove(&self, id: EntityId) -> bool {
        let mut pending = self.pending.lock();
        if let Some(pos) = pending.add.iter().position(|queued| queued.id() == id) {
            pending.add.remove(pos);
            return true;
        }
        if self.members.read().binary_search(&id).is_err() {
            return false;
        }
        pending.remove.insert(id)
    }

    /// Runs one round: applies queued changes, then updates every AI exactly
    /// once with `delta_millis`. Returns the number of AIs updated.
    pub fn update(&self, delta_millis: u64) -> usize {
        let mut ais = self.ais.lock();
        self.run_round(&mut ais, delta_millis)
    }

    /// Round driven by a `start` registration; skipped once it was stopped.
    fn scheduled_round(&self, delta_millis: u64, live: &AtomicBool) -> Option<usize> {
        let mut ais = self.ais.lock();
        if !live.load(Ordering::Acquire) {
            return None;
        }
        Some(self.run_round(&mut ais, delta_millis))
    }

    fn run_round(&self, ais: &mut Vec<Ai<C>>, delta_millis: u64) -> usize {
        self.apply_pending(ais);

        match &self.pool {
            Some(pool) => {
                let min_len = self.config.min_shard_len.max(1);
                let shards = ais.as_mut_slice();
                pool.install(move || {
                    shards.par_iter_mut().with_min_len(min_len).for_each(|ai| {
                        ai.update(delta_millis);
                    })
                });
            }
            None => {
                for ai in ais.iter_mut() {
                    ai.update(delta_millis);
                }
            }
        }

        if self.debug.load(Ordering::Relaxed) {
            for ai in ais.iter() {
                self.snapshots.insert(ai.id(), ai.snapshot());
            }
        }
        ais.len()
    }

    /// Runs `f` against one AI between rounds.
    pub fn execute<R>(&self, id: EntityId, f: impl FnOnce(&mut Ai<C>) -> R) -> Option<R> {
        let mut ais = self.ais.lock();
        self.apply_pending(&mut ais);
        let pos = ais.binary_search_by_key(&id, Ai::id).ok()?;
        Some(f(&mut ais[pos]))
    }

    /// Visits every AI in id order between rounds.
    pub fn for_each(&self, mut f: impl FnMut(&mut Ai<C>)) {
        let mut ais = self.ais.lock();
        self.apply_pending(&mut ais);
        for ai in ais.iter_mut() {
            f(ai);
        }
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.snapshots.clear();
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Snapshot published after the last round. Only filled in debug mode.
    pub fn snapshot(&self, id: EntityId) -> Option<AiSnapshot> {
        self.snapshots.get(&id)
    }

    pub fn snapshots(&self) -> Vec<AiSnapshot> {
        self.snapshots.entries().into_iter().map(|(_, s)| s).collect()
    }

    /// Drives rounds from `scheduler` every `tick_millis`, replacing any
    /// earlier registration.
    pub fn start(&self, scheduler: &Scheduler) -> Result<()> {
        let tick_millis = self.config.tick_millis;
        let period = Duration::from_millis(tick_millis);
        let me = self.me.clone();
        let live = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&live);
        let handle = scheduler.schedule_at_fixed_rate(period, period, move || {
            if let Some(zone) = me.upgrade() {
                zone.scheduled_round(tick_millis, &flag);
            }
        })?;

        if let Some(previous) = self.ticker.lock().replace(Ticker { handle, live }) {
            previous.halt();
        }
        tracing::info!(zone = %self.config.name, tick_millis, "zone started");
        Ok(())
    }

    /// Cancels scheduled rounds. A round in flight finishes before this
    /// returns, and none starts afterwards.
    pub fn stop(&self) {
        let Some(ticker) = self.ticker.lock().take() else {
            return;
        };
        ticker.halt();
        drop(self.ais.lock());
        tracing::info!(zone = %self.config.name, "zone stopped");
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().is_some()
    }

    fn apply_pending(&self, ais: &mut Vec<Ai<C>>) {
        let Pending { add, remove } = std::mem::take(&mut *self.pending.lock());
        if add.is_empty() && remove.is_empty() {
            return;
        }

        if !remove.is_empty() {
            ais.retain(|ai| !remove.contains(&ai.id()));
            for id in &remove {
                self.snapshots.remove(id);
                tracing::debug!(zone = %self.config.name, entity = %id, "ai removed");
            }
        }

        let view: Weak<dyn ZoneView> = self.me.clone();
        for mut ai in add {
            let id = ai.id();
            ai.set_zone(Some(view.clone()));
            if let Some(seed) = self.config.seed {
                ai.set_seed(seed);
            }
            match ais.binary_search_by_key(&id, Ai::id) {
                Ok(pos) => ais[pos] = ai,
                Err(pos) => ais.insert(pos, ai),
            }
            tracing::debug!(zone = %self.config.name, entity = %id, "ai added");
        }

        *self.members.write() = ais.iter().map(Ai::id).collect();
    }
}

impl<C: Character> ZoneView for Zone<C> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn entities(&self) -> Vec<EntityId> {
        self.members.read().clone()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.members.read().binary_search(&entity).is_ok()
    }

    fn len(&self) -> usize {
        self.members.read().len()
    }
}

impl<C: Character> Drop for Zone<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C: Character> std::fmt::Debug for Zone<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.config.name)
            .field("entities", &self.members.read().len())
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}
