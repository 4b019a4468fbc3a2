use ai_core::{DeterministicRng, EntityId, Status, TickContext};

#[test]
fn rng_streams_differ_per_tick_entity_and_stream() {
    let a = TickContext::new(0, 100, 100, 42);
    let b = TickContext::new(1, 100, 200, 42);

    let first = a.rng_for_entity(EntityId(1), 7).next_u64();
    assert_eq!(first, a.rng_for_entity(EntityId(1), 7).next_u64());
    assert_ne!(first, b.rng_for_entity(EntityId(1), 7).next_u64());
    assert_ne!(first, a.rng_for_entity(EntityId(2), 7).next_u64());
    assert_ne!(first, a.rng_for_entity(EntityId(1), 8).next_u64());
}

#[test]
fn status_classification() {
    assert_eq!(Status::default(), Status::Unknown);
    assert!(Status::Running.is_running());
    assert!(!Status::Running.is_terminal());
    assert!(Status::Failed.is_failure());
    assert!(Status::CannotExecute.is_failure());
    assert!(!Status::Exception.is_failure());
    assert_eq!(Status::CannotExecute.to_string(), "CANNOTEXECUTE");
}
