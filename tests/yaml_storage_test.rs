//! Flat Backend Integration Tests
//!
//! Covers the mapping between configs and nested YAML documents:
//! - The yes/no boolean tokens in the persisted text
//! - Missing/empty files treated as "no data"
//! - Unknown document keys as hard errors
//! - Nested config and config-list recursion

mod common;

use std::sync::Arc;

use common::{init_logs, named_node, node_schema};
use conftree::{Config, Error, Schema, Setting, Value, YamlStorage};

// =============================================================================
// End-to-End Scenario
// =============================================================================

#[test]
fn test_boolean_round_trip_through_document_text() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let schema = Schema::new(vec![Setting::text("name"), Setting::boolean("alive")]);

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage);
    config.set("alive", true).unwrap();
    config.save(false).unwrap();

    // the persisted document uses the yes/no tokens, not true/false
    let text = std::fs::read_to_string(&path).unwrap();
    let alive_line = text
        .lines()
        .find(|l| l.trim_start().starts_with("alive:"))
        .unwrap_or_else(|| panic!("no alive line in document: {text}"));
    assert!(alive_line.contains("yes"), "unexpected line: {alive_line}");
    assert!(!alive_line.contains("true"));

    config.clear();
    assert_eq!(config.get("alive"), Some(&Value::Bool(false)));

    config.load(false).unwrap();
    assert_eq!(config.get("alive"), Some(&Value::Bool(true)));
}

#[test]
fn test_full_schema_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.yaml");
    let schema = node_schema();

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage.clone());
    config.set("name", "edge-1").unwrap();
    config.set("role", Value::Int(1)).unwrap();
    config.set("weight", Value::None).unwrap();
    config.set("tags", vec!["arm", "spot"]).unwrap();
    config.save(false).unwrap();

    let mut reloaded = Config::with_storage(&schema, storage);
    reloaded.load(false).unwrap();
    assert_eq!(reloaded.get("name"), Some(&Value::Text("edge-1".into())));
    assert_eq!(reloaded.get("role"), Some(&Value::Int(1)));
    assert_eq!(reloaded.get("weight"), Some(&Value::None));
    assert_eq!(
        reloaded.get("tags"),
        Some(&Value::TextList(vec!["arm".into(), "spot".into()]))
    );
}

// =============================================================================
// Missing / Empty Files
// =============================================================================

#[test]
fn test_missing_file_is_created_and_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.yaml");
    let schema = node_schema();

    let mut config = Config::with_storage(&schema, Arc::new(YamlStorage::new(&path)));
    config.set("name", "kept").unwrap();
    config.load(false).unwrap();

    assert!(path.exists());
    assert_eq!(config.get("name"), Some(&Value::Text("kept".into())));
}

#[test]
fn test_empty_file_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.yaml");
    std::fs::write(&path, "").unwrap();
    let schema = node_schema();

    let mut config = Config::with_storage(&schema, Arc::new(YamlStorage::new(&path)));
    config.set("weight", 7_i64).unwrap();
    config.load(false).unwrap();
    assert_eq!(config.get("weight"), Some(&Value::Int(7)));
}

// =============================================================================
// Hard Errors
// =============================================================================

#[test]
fn test_unknown_document_key_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stray.yaml");
    std::fs::write(&path, "name: ok\nstray-key: 1\n").unwrap();
    let schema = node_schema();

    let mut config = Config::with_storage(&schema, Arc::new(YamlStorage::new(&path)));
    match config.load(false) {
        Err(Error::UnknownSetting(key)) => assert_eq!(key, "stray-key"),
        other => panic!("expected UnknownSetting, got {other:?}"),
    }
}

#[test]
fn test_unknown_choice_token_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("badrole.yaml");
    std::fs::write(&path, "role: coordinator\n").unwrap();
    let schema = node_schema();

    let mut config = Config::with_storage(&schema, Arc::new(YamlStorage::new(&path)));
    assert!(matches!(
        config.load(false),
        Err(Error::UnknownChoiceToken { .. })
    ));
}

// =============================================================================
// Nested Recursion
// =============================================================================

#[test]
fn test_config_list_round_trips_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.yaml");
    let schema = node_schema();

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage.clone());
    let mut alpha = named_node(&schema, "alpha");
    alpha.set("weight", 1_i64).unwrap();
    let mut beta = named_node(&schema, "beta");
    beta.set("weight", 2_i64).unwrap();
    config.set("peers", vec![alpha, beta]).unwrap();
    config.save(false).unwrap();

    let mut reloaded = Config::with_storage(&schema, storage);
    reloaded.load(false).unwrap();
    let peers = reloaded.get("peers").unwrap().as_config_list().unwrap();
    assert_eq!(peers.len(), 2);
    assert_eq!(peers[0].get("name"), Some(&Value::Text("alpha".into())));
    assert_eq!(peers[0].get("weight"), Some(&Value::Int(1)));
    assert_eq!(peers[1].get("name"), Some(&Value::Text("beta".into())));
    assert_eq!(peers[1].get("weight"), Some(&Value::Int(2)));
}

#[test]
fn test_nested_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.yaml");
    let schema = node_schema();

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage.clone());
    config
        .set("fallback", named_node(&schema, "backup"))
        .unwrap();
    config.save(false).unwrap();

    let mut reloaded = Config::with_storage(&schema, storage);
    reloaded.load(false).unwrap();
    let child = reloaded.get("fallback").unwrap().as_config().unwrap();
    assert_eq!(child.get("name"), Some(&Value::Text("backup".into())));
    // the unset placeholder restores an unset nested config
    assert_eq!(child.get("fallback"), Some(&Value::None));
}

// =============================================================================
// Merge Semantics
// =============================================================================

#[test]
fn test_merge_save_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.yaml");
    let schema = node_schema();

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage.clone());
    config.set("weight", 99_i64).unwrap();
    config.save(true).unwrap();

    // the in-memory config was reset before saving
    assert_eq!(config.get("weight"), Some(&Value::Int(13)));

    let mut reloaded = Config::with_storage(&schema, storage);
    reloaded.load(false).unwrap();
    assert_eq!(reloaded.get("weight"), Some(&Value::Int(13)));
}

#[test]
fn test_merge_load_equals_clear_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nodes.yaml");
    let schema = node_schema();

    let storage = Arc::new(YamlStorage::new(&path));
    let mut config = Config::with_storage(&schema, storage.clone());
    config.set("weight", 42_i64).unwrap();
    config.save(false).unwrap();

    let mut merged = Config::with_storage(&schema, storage.clone());
    merged.set("name", "doomed").unwrap();
    merged.load(true).unwrap();

    let mut manual = Config::with_storage(&schema, storage);
    manual.set("name", "doomed").unwrap();
    manual.clear();
    manual.load(false).unwrap();

    assert_eq!(merged, manual);
    assert_eq!(merged.get("name"), Some(&Value::None));
}
