//! Validate a bundle once at the root, promote every member.

use crate::prelude::Repo;
use edison_core::cancel::CancelToken;
use edison_core::relationship::RelationKind;
use edison_core::state::TaskState;
use edison_engine::promote;
use edison_graph::RelationshipGraph;
use edison_qa::{BundleScope, FakeExecutor, ValidationRunner};

fn seed_bundle(repo: &Repo) {
    repo.add_task("A");
    repo.add_task("B");
    repo.add_task("C");
    let graph = RelationshipGraph::new(&repo.tasks);
    graph.add(RelationKind::BundleRoot, "B", "A").unwrap();
    graph.add(RelationKind::BundleRoot, "C", "A").unwrap();
    for id in ["A", "B", "C"] {
        let mut task = repo.tasks.load(id).unwrap();
        task.state = TaskState::Done;
        repo.tasks.save(&task).unwrap();
    }
}

#[test]
fn one_approved_round_promotes_all_members() {
    let repo = Repo::new().with_global_codex();
    seed_bundle(&repo);

    let runner = ValidationRunner::new(
        &repo.layout,
        &repo.tasks,
        &repo.qa,
        &repo.config,
        &repo.clock,
    );
    let plan = runner
        .plan("A", BundleScope::Bundle, &[], None)
        .unwrap();
    assert_eq!(plan.tasks, vec!["A", "B", "C"]);
    assert_eq!(plan.roster, vec!["global-codex"]);

    let executor = FakeExecutor::approving(repo.clock.clone());
    let summary = runner
        .execute(&plan, &executor, &CancelToken::new(), &repo.actor())
        .unwrap();
    assert!(summary.approved);
    assert!(summary.missing.is_empty());

    // Validators ran once, at the root's evidence directory.
    assert_eq!(executor.executed(), vec!["global-codex"]);
    assert!(repo
        .layout
        .round_dir("A", 1)
        .join("global-codex.json")
        .is_file());
    assert!(!repo.layout.evidence_task_dir("B").exists());
    assert!(!repo.layout.evidence_task_dir("C").exists());

    // The implementation report is the only other required evidence
    // under the quick preset.
    repo.write_file(
        ".project/qa/validation-evidence/A/round-1/implementation-report.md",
        "Implemented the bundle.\n",
    );

    // Members promote without per-member validator files.
    let outcome = promote(&repo.engine(), "B", BundleScope::Bundle).unwrap();
    assert_eq!(outcome.promoted, vec!["A", "B", "C"]);
    for id in ["A", "B", "C"] {
        assert_eq!(repo.tasks.load(id).unwrap().state, TaskState::Validated);
    }
}

#[test]
fn rejected_round_blocks_promotion_for_every_member() {
    let repo = Repo::new().with_global_codex();
    seed_bundle(&repo);

    let runner = ValidationRunner::new(
        &repo.layout,
        &repo.tasks,
        &repo.qa,
        &repo.config,
        &repo.clock,
    );
    let plan = runner.plan("A", BundleScope::Bundle, &[], None).unwrap();
    let executor = FakeExecutor::approving(repo.clock.clone()).with_outcome(
        "global-codex",
        edison_qa::ValidationStatus::Rejected,
    );
    let summary = runner
        .execute(&plan, &executor, &CancelToken::new(), &repo.actor())
        .unwrap();
    assert!(!summary.approved);

    let err = promote(&repo.engine(), "C", BundleScope::Bundle).unwrap_err();
    assert_eq!(err.code(), "transition_blocked");
    assert_eq!(repo.tasks.load("C").unwrap().state, TaskState::Done);
}
