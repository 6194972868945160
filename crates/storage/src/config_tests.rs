// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn repo_with_config(files: &[(&str, &str)]) -> (tempfile::TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(".edison/config");
    std::fs::create_dir_all(&config_dir).unwrap();
    for (name, content) in files {
        std::fs::write(config_dir.join(name), content).unwrap();
    }
    let layout = Layout::discover(dir.path()).unwrap();
    (dir, layout)
}

fn no_env() -> impl Iterator<Item = (String, String)> {
    std::iter::empty()
}

#[test]
fn missing_config_dir_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
    let layout = Layout::discover(dir.path()).unwrap();
    let manager = ConfigManager::load_with_env(&layout, no_env()).unwrap();
    assert_eq!(manager.typed().session.recovery.stale_after_seconds, 3600);
}

#[test]
fn files_merge_in_name_order_last_wins() {
    let (_dir, layout) = repo_with_config(&[
        ("10-base.yaml", "session:\n  recovery:\n    stale_after_seconds: 100\n"),
        ("20-override.yaml", "session:\n  recovery:\n    stale_after_seconds: 200\n"),
    ]);
    let manager = ConfigManager::load_with_env(&layout, no_env()).unwrap();
    assert_eq!(manager.typed().session.recovery.stale_after_seconds, 200);
}

#[test]
fn merge_is_deep_not_replacing() {
    let (_dir, layout) = repo_with_config(&[
        ("a.yaml", "session:\n  recovery:\n    block_on_stale: true\n"),
        ("b.yaml", "session:\n  recovery:\n    stale_after_seconds: 50\n"),
    ]);
    let manager = ConfigManager::load_with_env(&layout, no_env()).unwrap();
    assert!(manager.typed().session.recovery.block_on_stale);
    assert_eq!(manager.typed().session.recovery.stale_after_seconds, 50);
}

#[test]
fn env_override_with_double_underscore_path() {
    let (_dir, layout) = repo_with_config(&[]);
    let env = vec![(
        "EDISON_SESSION__RECOVERY__BLOCK_ON_STALE".to_string(),
        "true".to_string(),
    )];
    let manager = ConfigManager::load_with_env(&layout, env.into_iter()).unwrap();
    assert!(manager.typed().session.recovery.block_on_stale);
}

#[test]
fn env_vars_without_separator_are_ignored() {
    let (_dir, layout) = repo_with_config(&[]);
    let env = vec![
        ("EDISON_LOG".to_string(), "debug".to_string()),
        ("EDISON_ACTOR_KIND".to_string(), "agent".to_string()),
        ("UNRELATED".to_string(), "x".to_string()),
    ];
    // Would be a config error (unknown key) if applied.
    assert!(ConfigManager::load_with_env(&layout, env.into_iter()).is_ok());
}

#[test]
fn unknown_config_key_is_rejected() {
    let (_dir, layout) = repo_with_config(&[("a.yaml", "sessions: {}\n")]);
    let err = ConfigManager::load_with_env(&layout, no_env()).unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn invalid_yaml_is_config_error_naming_the_file() {
    let (_dir, layout) = repo_with_config(&[("broken.yaml", "a: [oops\n")]);
    let err = ConfigManager::load_with_env(&layout, no_env()).unwrap_err();
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn dotted_lookup_observes_defaults() {
    let (_dir, layout) = repo_with_config(&[]);
    let manager = ConfigManager::load_with_env(&layout, no_env()).unwrap();
    assert_eq!(
        manager.lookup_string("session.recovery.stale_after_seconds").as_deref(),
        Some("3600")
    );
    assert_eq!(
        manager.lookup_string("continuation.default_mode").as_deref(),
        Some("off")
    );
    assert_eq!(manager.lookup_string("no.such.key"), None);
    // Mappings are not substitutable.
    assert_eq!(manager.lookup_string("session.recovery"), None);
}

#[test]
fn deep_merge_replaces_sequences() {
    let mut base: Value = serde_yaml::from_str("xs: [1, 2]\n").unwrap();
    let overlay: Value = serde_yaml::from_str("xs: [3]\n").unwrap();
    deep_merge(&mut base, overlay);
    let xs = base.get("xs").unwrap().as_sequence().unwrap();
    assert_eq!(xs.len(), 1);
}
