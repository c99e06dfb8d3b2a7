//! Package Bootstrap Integration Tests

mod common;

use common::init_logs;
use conftree::bootstrap::PackageConfig;
use conftree::Value;

// =============================================================================
// File Discovery
// =============================================================================

#[test]
fn test_first_existing_candidate_wins() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first/config");
    let second = dir.path().join("second/config");
    std::fs::create_dir_all(second.parent().unwrap()).unwrap();
    std::fs::write(second.with_extension("yaml"), "log-level: debug\n").unwrap();

    let mut pc = PackageConfig::with_search_stems("pkg", vec![first.clone(), second]);
    pc.load_system().unwrap();

    assert_eq!(
        pc.config().get("log-level"),
        Some(&Value::Text("debug".into()))
    );
    // the higher-priority stem stays untouched
    assert!(!first.with_extension("tree").exists());
    assert!(!first.with_extension("yaml").exists());
}

#[test]
fn test_missing_candidates_fall_back_to_first_stem() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("app/config");

    let mut pc = PackageConfig::with_search_stems("app", vec![stem.clone()]);
    pc.load_system().unwrap();

    // the first load leaves a stub file behind at the first stem
    assert!(stem.with_extension("tree").exists());
    assert_eq!(
        pc.config().get("log-level"),
        Some(&Value::Text("warn".into()))
    );
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_level_survives_save_and_rediscovery() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let stem = dir.path().join("tool/config");

    let mut pc = PackageConfig::with_search_stems("tool", vec![stem.clone()]);
    pc.load_system().unwrap();
    pc.config_mut().set("log-level", "trace").unwrap();
    pc.config_mut().save(false).unwrap();

    let mut again = PackageConfig::with_search_stems("tool", vec![stem]);
    again.load_system().unwrap();
    assert_eq!(
        again.config().get("log-level"),
        Some(&Value::Text("trace".into()))
    );
}
