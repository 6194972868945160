//! Dependency edges gate claiming until targets are satisfied.

use crate::prelude::Repo;
use edison_core::relationship::RelationKind;
use edison_core::state::TaskState;
use edison_engine::claim_task;
use edison_graph::{ready_tasks, RelationshipGraph, TaskGraph};

#[test]
fn depends_on_blocks_claim_until_validated() {
    let repo = Repo::new();
    repo.add_session("S1");
    repo.add_task("X");
    repo.add_task("Y");
    RelationshipGraph::new(&repo.tasks)
        .add(RelationKind::DependsOn, "X", "Y")
        .unwrap();

    // Y is still todo: claiming X fails, naming the unmet dependency.
    let err = claim_task(&repo.engine(), "S1", "X").unwrap_err();
    assert_eq!(err.exit_code(), 3);
    match err {
        edison_core::Error::DependenciesUnsatisfied { task, unmet } => {
            assert_eq!(task, "X");
            assert_eq!(unmet, vec!["Y"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Y validates; X becomes ready and claimable.
    let mut y = repo.tasks.load("Y").unwrap();
    y.state = TaskState::Validated;
    repo.tasks.save(&y).unwrap();

    let graph = TaskGraph::load(&repo.tasks).unwrap();
    let satisfied = &repo.config.validation.dependency_satisfied_states;
    let ready: Vec<_> = ready_tasks(&graph, satisfied)
        .iter()
        .map(|t| t.id.to_string())
        .collect();
    assert_eq!(ready, vec!["X"]);

    let outcome = claim_task(&repo.engine(), "S1", "X").unwrap();
    assert_eq!(outcome.state, TaskState::Wip);
}

#[test]
fn inverse_blocks_edge_is_maintained_on_disk() {
    let repo = Repo::new();
    repo.add_task("X");
    repo.add_task("Y");
    RelationshipGraph::new(&repo.tasks)
        .add(RelationKind::DependsOn, "X", "Y")
        .unwrap();

    let y_text =
        std::fs::read_to_string(repo.layout.task_file(TaskState::Todo, "Y")).unwrap();
    assert!(y_text.contains("type: blocks"));
    assert!(y_text.contains("target: X"));
}
