//! Thread-safe containers for cross-entity data.
//!
//! Tasks and conditions of different AIs run on different tick threads at the
//! same time, so anything they share has to live in one of these.

use std::collections::VecDeque;
use std::hash::Hash;

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};

/// FIFO queue with blocking pops that can be aborted.
///
/// After [`ConcurrentQueue::abort`] every waiting and future
/// [`ConcurrentQueue::wait_and_pop`] returns `None`, and pushes are dropped.
#[derive(Debug)]
pub struct ConcurrentQueue<T> {
    inner: Mutex<QueueState<T>>,
    available: Condvar,
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    aborted: bool,
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueState {
                items: VecDeque::new(),
                aborted: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Returns `false` if the queue was aborted and the item dropped.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.inner.lock();
        if state.aborted {
            return false;
        }
        state.items.push_back(item);
        drop(state);
        self.available.notify_one();
        true
    }

    pub fn pop(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Blocks until an item is available or the queue is aborted.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut state = self.inner.lock();
        loop {
            if state.aborted {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            self.available.wait(&mut state);
        }
    }

    /// Wakes every waiter and refuses further work. Queued items are dropped.
    pub fn abort(&self) {
        let mut state = self.inner.lock();
        state.aborted = true;
        state.items.clear();
        drop(state);
        self.available.notify_all();
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.lock().aborted
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().items.clear();
    }
}

/// Concurrent map handing out clones, so no reader ever holds a shard lock
/// while the owner is writing.
#[derive(Debug)]
pub struct ConcurrentMap<K: Eq + Hash, V> {
    inner: DashMap<K, V>,
}

impl<K: Eq + Hash, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ConcurrentMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Applies `f` to the value in place, if present.
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.inner.get_mut(key).map(|mut entry| f(entry.value_mut()))
    }
}

impl<K: Eq + Hash + Clone + Ord, V: Clone> ConcurrentMap<K, V> {
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.inner.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// `(key, value)` pairs in ascending key order.
    pub fn entries(&self) -> Vec<(K, V)> {
        let mut entries: Vec<(K, V)> = self
            .inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
