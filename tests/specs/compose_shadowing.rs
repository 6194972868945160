//! Composition rejects vendor shadowing without the explicit opt-in.

use crate::prelude::Repo;
use edison_compose::{ComposePipeline, ContentType};
use edison_core::cancel::CancelToken;
use edison_storage::ConfigManager;

fn vendor_export_yaml(allow: bool) -> serde_yaml::Value {
    let yaml = format!(
        r#"
vendors:
  exports:
    - vendor: ai-catalog
      source_path: testing/tdd.md
      content_type: skills
      name: testing/tdd
      allow_shadowing: {allow}
"#
    );
    serde_yaml::from_str(&yaml).unwrap()
}

#[test]
fn vendor_shadowing_without_opt_in_fails_naming_key_and_flag() {
    let repo = Repo::new();
    repo.write_file(".edison/core/skills/testing/tdd.md", "core tdd\n");
    repo.write_file(
        ".edison/vendors/ai-catalog/worktree/testing/tdd.md",
        "vendor tdd\n",
    );
    let manager = ConfigManager::from_value(vendor_export_yaml(false)).unwrap();
    let pipeline = ComposePipeline::new(&repo.layout, &manager, &repo.clock, "0.1.0");

    let report = pipeline.compose_all(&CancelToken::new()).unwrap();
    assert!(!report.is_success());
    let error = report
        .errors
        .iter()
        .find(|e| e.contains("skills/testing/tdd"))
        .expect("collision error names the key");
    assert!(error.contains("allow_shadowing"));
}

#[test]
fn vendor_shadowing_with_opt_in_wins() {
    let repo = Repo::new();
    repo.write_file(".edison/core/skills/testing/tdd.md", "core tdd\n");
    repo.write_file(
        ".edison/vendors/ai-catalog/worktree/testing/tdd.md",
        "vendor tdd\n",
    );
    let manager = ConfigManager::from_value(vendor_export_yaml(true)).unwrap();
    let pipeline = ComposePipeline::new(&repo.layout, &manager, &repo.clock, "0.1.0");

    let report = pipeline
        .compose_type(ContentType::Skills, &CancelToken::new())
        .unwrap();
    assert!(report.is_success(), "unexpected: {report:?}");
    let generated = std::fs::read_to_string(
        repo.layout.generated_dir().join("skills/testing/tdd.md"),
    )
    .unwrap();
    assert_eq!(generated, "vendor tdd\n");
}

#[test]
fn composition_is_deterministic_across_runs() {
    let repo = Repo::new();
    repo.write_file(".edison/core/agents/reviewer.md", "Review carefully.\n");
    let manager = ConfigManager::from_value(serde_yaml::Value::Null).unwrap();
    let pipeline = ComposePipeline::new(&repo.layout, &manager, &repo.clock, "0.1.0");

    pipeline.compose_all(&CancelToken::new()).unwrap();
    let target = repo.layout.generated_dir().join("agents/reviewer.md");
    let first = std::fs::read_to_string(&target).unwrap();
    pipeline.compose_all(&CancelToken::new()).unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), first);
}
