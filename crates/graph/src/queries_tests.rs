// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::clock::FakeClock;
use edison_core::relationship::RelationKind;

fn task(id: &str, state: TaskState) -> Task {
    let clock = FakeClock::at(1_700_000_000_000);
    let mut t = Task::new(id, format!("task {id}"), &clock);
    t.state = state;
    t
}

fn with_edge(mut t: Task, kind: RelationKind, target: &str) -> Task {
    t.add_relationship(kind, target).unwrap();
    t
}

const SATISFIED: [TaskState; 2] = [TaskState::Validated, TaskState::Archived];

#[test]
fn descendants_walks_child_closure() {
    let graph = TaskGraph::from_tasks(vec![
        with_edge(
            with_edge(task("root", TaskState::Todo), RelationKind::Child, "a"),
            RelationKind::Child,
            "b",
        ),
        with_edge(task("a", TaskState::Todo), RelationKind::Child, "a1"),
        task("a1", TaskState::Todo),
        task("b", TaskState::Todo),
        task("unrelated", TaskState::Todo),
    ]);
    assert_eq!(graph.descendants("root"), vec!["a", "a1", "b"]);
    assert!(graph.descendants("a1").is_empty());
}

#[test]
fn descendants_tolerates_cycles() {
    let graph = TaskGraph::from_tasks(vec![
        with_edge(task("x", TaskState::Todo), RelationKind::Child, "y"),
        with_edge(task("y", TaskState::Todo), RelationKind::Child, "x"),
    ]);
    assert_eq!(graph.descendants("x"), vec!["y"]);
}

#[test]
fn bundle_members_matches_bundle_root() {
    let graph = TaskGraph::from_tasks(vec![
        task("A", TaskState::Todo),
        with_edge(task("C", TaskState::Todo), RelationKind::BundleRoot, "A"),
        with_edge(task("B", TaskState::Todo), RelationKind::BundleRoot, "A"),
        with_edge(task("D", TaskState::Todo), RelationKind::BundleRoot, "other"),
    ]);
    assert_eq!(graph.bundle_members("A"), vec!["B", "C"]);
}

#[test]
fn readiness_fails_closed_on_missing_dependency() {
    let graph = TaskGraph::from_tasks(vec![with_edge(
        task("X", TaskState::Todo),
        RelationKind::DependsOn,
        "ghost",
    )]);
    let x = graph.get("X").unwrap();
    let readiness = graph.readiness(x, &SATISFIED);
    assert!(!readiness.ready);
    assert_eq!(readiness.unmet, vec!["ghost"]);
}

#[test]
fn readiness_tracks_dependency_states() {
    let graph = TaskGraph::from_tasks(vec![
        with_edge(task("X", TaskState::Todo), RelationKind::DependsOn, "Y"),
        task("Y", TaskState::Todo),
    ]);
    let x = graph.get("X").unwrap();
    assert!(!graph.readiness(x, &SATISFIED).ready);

    let graph = TaskGraph::from_tasks(vec![
        with_edge(task("X", TaskState::Todo), RelationKind::DependsOn, "Y"),
        task("Y", TaskState::Validated),
    ]);
    let x = graph.get("X").unwrap();
    assert!(graph.readiness(x, &SATISFIED).ready);
}

#[test]
fn ready_tasks_filters_todo_with_satisfied_deps() {
    let graph = TaskGraph::from_tasks(vec![
        task("free", TaskState::Todo),
        with_edge(task("gated", TaskState::Todo), RelationKind::DependsOn, "free"),
        task("already-wip", TaskState::Wip),
    ]);
    let ready: Vec<_> = ready_tasks(&graph, &SATISFIED)
        .iter()
        .map(|t| t.id.to_string())
        .collect();
    assert_eq!(ready, vec!["free"]);
}

#[test]
fn waves_layer_by_dependencies() {
    let graph = TaskGraph::from_tasks(vec![
        task("a", TaskState::Todo),
        with_edge(task("b", TaskState::Todo), RelationKind::DependsOn, "a"),
        with_edge(task("c", TaskState::Todo), RelationKind::DependsOn, "b"),
        task("d", TaskState::Todo),
    ]);
    assert_eq!(
        graph.waves(&SATISFIED),
        vec![
            vec!["a".to_string(), "d".to_string()],
            vec!["b".to_string()],
            vec!["c".to_string()],
        ]
    );
}

#[test]
fn waves_keep_related_tasks_adjacent() {
    let graph = TaskGraph::from_tasks(vec![
        with_edge(task("alpha", TaskState::Todo), RelationKind::Related, "zeta"),
        task("mid", TaskState::Todo),
        with_edge(task("zeta", TaskState::Todo), RelationKind::Related, "alpha"),
    ]);
    assert_eq!(
        graph.waves(&SATISFIED),
        vec![vec![
            "alpha".to_string(),
            "zeta".to_string(),
            "mid".to_string(),
        ]]
    );
}

#[test]
fn waves_stop_at_unsatisfiable_dependencies() {
    let graph = TaskGraph::from_tasks(vec![with_edge(
        task("stuck", TaskState::Todo),
        RelationKind::DependsOn,
        "ghost",
    )]);
    assert!(graph.waves(&SATISFIED).is_empty());
}
