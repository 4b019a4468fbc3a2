use crate::{rng, EntityId, SplitMix64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Number of updates this AI has run, starting at 0.
    pub tick: u64,
    pub delta_millis: u64,
    /// Accumulated simulation time of the AI, including this tick.
    pub time_millis: u64,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, delta_millis: u64, time_millis: u64, seed: u64) -> Self {
        Self {
            tick,
            delta_millis,
            time_millis,
            seed,
        }
    }

    /// RNG stream unique to `(seed, entity, stream, tick)`.
    pub fn rng_for_entity(&self, entity: EntityId, stream: u64) -> SplitMix64 {
        let stream = rng::mix64(stream ^ rng::mix64(self.tick.wrapping_add(1)));
        let seed = rng::derive_seed(self.seed, entity.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
