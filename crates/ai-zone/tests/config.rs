use std::io::Write;

use ai_zone::{ConfigError, ZoneConfig};

#[test]
fn defaults_describe_a_parallel_ten_hertz_zone() {
    let config = ZoneConfig::default();
    assert_eq!(config.name, "zone");
    assert_eq!(config.tick_millis, 100);
    assert_eq!(config.worker_threads, 0);
    assert!(config.parallel);
    assert_eq!(config.min_shard_len, 16);
    assert!(!config.debug);
    assert_eq!(config.seed, None);
}

#[test]
fn partial_yaml_keeps_defaults_for_missing_keys() {
    let config = ZoneConfig::from_yaml("name: village\ntick_millis: 50\nseed: 42\n").unwrap();
    assert_eq!(config.name, "village");
    assert_eq!(config.tick_millis, 50);
    assert_eq!(config.seed, Some(42));
    assert!(config.parallel);
    assert_eq!(config.min_shard_len, 16);
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name: dungeon").unwrap();
    writeln!(file, "parallel: false").unwrap();
    writeln!(file, "debug: true").unwrap();

    let config = ZoneConfig::load(file.path()).unwrap();
    assert_eq!(config.name, "dungeon");
    assert!(!config.parallel);
    assert!(config.debug);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    match ZoneConfig::load(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = ZoneConfig::from_yaml("tick_millis: [fast]").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("failed to parse zone config"));
}
