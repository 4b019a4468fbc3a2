use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for an AI-controlled entity.
///
/// Used as the key of every per-entity side-table, so it must stay constant for
/// the lifetime of the entity and be unique within a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(pub u64);

impl EntityId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric id used for seeding and logs.
    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability contract of the game-side character an AI is bound to.
///
/// The runtime only needs a stable identity; everything else is game semantics
/// exposed through defaulted hooks. Implementations are shared across tick
/// threads by reference, so any mutation has to go through interior mutability.
pub trait Character: Send + Sync + 'static {
    fn id(&self) -> EntityId;

    /// Advance the character's own simulation clock. Called once per AI update,
    /// before the behavior tree runs.
    fn update(&self, _delta_millis: u64) {}

    /// Entities this character is hostile towards, highest aggro first.
    fn enemies(&self) -> Vec<EntityId> {
        Vec::new()
    }
}
