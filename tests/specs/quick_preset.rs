//! Docs-only changes resolve to the quick preset; code escalates.

use crate::prelude::Repo;
use edison_core::cancel::CancelToken;
use edison_core::state::TaskState;
use edison_engine::promote;
use edison_qa::{BundleScope, FakeExecutor, ValidationRunner};

#[test]
fn docs_only_task_needs_only_report_and_approval() {
    let repo = Repo::new().with_global_codex();
    repo.add_task("D");
    let mut task = repo.tasks.load("D").unwrap();
    task.state = TaskState::Done;
    repo.tasks.save(&task).unwrap();

    let runner = ValidationRunner::new(
        &repo.layout,
        &repo.tasks,
        &repo.qa,
        &repo.config,
        &repo.clock,
    );
    let changed = vec!["docs/WORKFLOWS.md".to_string()];

    // Dry run: roster and required evidence only.
    let plan = runner.plan("D", BundleScope::Auto, &changed, None).unwrap();
    assert_eq!(plan.policy.preset, "quick");
    assert_eq!(plan.roster, vec!["global-codex"]);
    assert_eq!(
        plan.policy.required_evidence,
        vec!["implementation-report.md"]
    );

    let executor = FakeExecutor::approving(repo.clock.clone());
    runner
        .execute(&plan, &executor, &CancelToken::new(), &repo.actor())
        .unwrap();

    // No command-lint.txt anywhere; the report plus the approved
    // validator is enough under quick.
    repo.write_file(
        ".project/qa/validation-evidence/D/round-1/implementation-report.md",
        "Updated the workflow docs.\n",
    );
    let outcome = promote(&repo.engine(), "D", BundleScope::Auto).unwrap();
    assert_eq!(outcome.promoted, vec!["D"]);
}

#[test]
fn code_change_escalates_past_an_explicit_quick_preset() {
    let repo = Repo::new().with_global_codex();
    repo.add_task("E");

    let runner = ValidationRunner::new(
        &repo.layout,
        &repo.tasks,
        &repo.qa,
        &repo.config,
        &repo.clock,
    );
    let changed = vec!["README.md".to_string(), "src/resolver.ts".to_string()];
    let plan = runner
        .plan("E", BundleScope::Auto, &changed, Some("quick"))
        .unwrap();
    assert_eq!(plan.policy.preset, "standard");
    assert!(plan
        .policy
        .required_evidence
        .contains(&"command-lint.txt".to_string()));
}

#[test]
fn readme_only_resolves_quick() {
    let repo = Repo::new().with_global_codex();
    repo.add_task("F");
    let runner = ValidationRunner::new(
        &repo.layout,
        &repo.tasks,
        &repo.qa,
        &repo.config,
        &repo.clock,
    );
    let plan = runner
        .plan("F", BundleScope::Auto, &["README.md".to_string()], None)
        .unwrap();
    assert_eq!(plan.policy.preset, "quick");
}
