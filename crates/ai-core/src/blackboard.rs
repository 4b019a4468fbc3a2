//! Entity-local typed scratch storage.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed key into a [`Blackboard`].
///
/// The id is what gets stored; `T` pins the value type at compile time so
/// every access through the same key agrees on it.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    _value: PhantomData<fn() -> T>,
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BbKey({:#x})", self.id)
    }
}

type Slot = Box<dyn Any + Send + Sync>;

/// Scratch storage owned by one AI.
///
/// Values are `Send + Sync` because an AI may be ticked on a different zone
/// worker every round. Reading a slot through a key of the wrong type yields
/// `None`, exactly like an empty slot.
#[derive(Default)]
pub struct Blackboard {
    slots: BTreeMap<u64, Slot>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// `true` if the slot holds a `T`.
    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value`, returning the previous `T` in that slot, if any.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: BbKey<T>, value: T) -> Option<T> {
        let previous = self.slots.insert(key.id, Box::new(value))?;
        previous.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        self.slots.get(&key.id)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        self.slots.get_mut(&key.id)?.downcast_mut::<T>()
    }

    /// Takes the value out. A slot of another type is left in place.
    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        if !self.slots.get(&key.id)?.is::<T>() {
            return None;
        }
        let slot = self.slots.remove(&key.id)?;
        slot.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.slots.keys().map(|id| format!("{id:#x}")))
            .finish()
    }
}
