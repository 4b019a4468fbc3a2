use crate::EntityId;

/// Read-only view of the group an entity lives in.
///
/// Queries through this trait may run on any tick thread concurrently with
/// other entities' updates, so implementations must be internally synchronized.
/// Subsystems that need richer queries (spatial, grouping, ...) should define
/// extension traits instead of growing this one.
pub trait ZoneView: Send + Sync {
    fn name(&self) -> &str;

    /// Every entity currently registered in the zone, in ascending id order.
    fn entities(&self) -> Vec<EntityId>;

    fn contains(&self, entity: EntityId) -> bool {
        self.entities().binary_search(&entity).is_ok()
    }

    fn len(&self) -> usize {
        self.entities().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
