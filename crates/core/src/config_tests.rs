// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_value_yields_defaults() {
    let config = EdisonConfig::from_value(serde_yaml::Value::Null).unwrap_or_default();
    assert!(!config.session.recovery.block_on_stale);
    assert_eq!(config.session.recovery.stale_after_seconds, 3600);
    assert_eq!(config.continuation.default_mode, ContinuationMode::Off);
    assert_eq!(config.compose.include_depth, 3);
}

#[test]
fn default_presets_escalate_quick_then_standard() {
    let validation = ValidationConfig::default();
    assert_eq!(validation.preset_rank("quick"), Some(0));
    assert_eq!(validation.preset_rank("standard"), Some(1));
    assert_eq!(validation.preset_rank("paranoid"), None);

    let quick = validation.preset("quick").unwrap();
    assert_eq!(quick.required_evidence, vec!["implementation-report.md"]);
    let standard = validation.preset("standard").unwrap();
    assert!(standard
        .required_evidence
        .contains(&"command-lint.txt".to_string()));
}

#[test]
fn unknown_preset_is_config_error() {
    let err = ValidationConfig::default().preset("nope").unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = "session:\n  recovery:\n    block_on_stale: true\n    retries: 3\n";
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    let err = EdisonConfig::from_value(value).unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn partial_yaml_overrides_one_field() {
    let yaml = "session:\n  recovery:\n    stale_after_seconds: 120\n";
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    let config = EdisonConfig::from_value(value).unwrap();
    assert_eq!(config.session.recovery.stale_after_seconds, 120);
    assert!(!config.session.recovery.block_on_stale);
}

#[test]
fn validators_parse_with_defaults() {
    let yaml = r#"
validation:
  validators:
    global-codex:
      triggers: ["**/*.rs"]
    docs-lint:
      always_run: true
      blocks_on_fail: false
"#;
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    let config = EdisonConfig::from_value(value).unwrap();
    let codex = &config.validation.validators["global-codex"];
    assert!(codex.blocks_on_fail);
    assert!(!codex.always_run);
    assert_eq!(config.validation.always_run_validators(), vec!["docs-lint"]);
}

#[test]
fn default_dependency_satisfied_states() {
    let validation = ValidationConfig::default();
    assert_eq!(
        validation.dependency_satisfied_states,
        vec![TaskState::Validated, TaskState::Archived]
    );
}

#[test]
fn default_inference_buckets_cover_docs_and_code() {
    let inference = PresetInference::default();
    assert_eq!(inference.buckets.len(), 2);
    assert!(!inference.buckets[0].code);
    assert!(inference.buckets[1].code);
    assert_eq!(inference.fallback, "quick");
}

#[test]
fn completion_policy_round_trip() {
    assert_eq!(
        "all_tasks_validated".parse::<CompletionPolicy>().unwrap(),
        CompletionPolicy::AllTasksValidated
    );
    assert_eq!(
        CompletionPolicy::ParentValidatedChildrenDone.to_string(),
        "parent_validated_children_done"
    );
    assert!("strict".parse::<CompletionPolicy>().is_err());
}

#[test]
fn vendor_export_defaults_shadowing_off() {
    let yaml = r#"
vendor: ai-catalog
source_path: skills/testing/tdd
content_type: skills
name: tdd
"#;
    let export: VendorExport = serde_yaml::from_str(yaml).unwrap();
    assert!(!export.allow_shadowing);
}
