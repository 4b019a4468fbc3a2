#![cfg(feature = "serde")]

use ai_core::{EntityId, Status};
use ai_tools::{AiSnapshot, NodeSnapshot, TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, "bt.node.status").with_a(10).with_b(2),
            TraceEvent::new(2, "bt.task.fault")
                .with_entity(EntityId(4))
                .with_a(3),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}

#[test]
fn ai_snapshot_json_roundtrip() {
    let snap = AiSnapshot {
        entity: EntityId(7),
        tick: 12,
        time_millis: 1200,
        status: Status::Running,
        paused: false,
        root: NodeSnapshot {
            id: 0,
            name: "Idle{3000}".to_string(),
            condition: "True".to_string(),
            status: Status::Running,
            children: Vec::new(),
        },
    };

    let json = serde_json::to_string(&snap).expect("serialize");
    let roundtrip: AiSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, snap);
}
