// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::clock::FakeClock;
use edison_core::relationship::RelationKind;
use edison_core::state::TaskState;
use edison_core::task::Task;

fn task(id: &str) -> Task {
    let clock = FakeClock::at(1_700_000_000_000);
    let mut t = Task::new(id, format!("task {id}"), &clock);
    t.state = TaskState::Todo;
    t
}

fn with_edge(mut t: Task, kind: RelationKind, target: &str) -> Task {
    t.add_relationship(kind, target).unwrap();
    t
}

/// A: root; B, C have bundle_root=A; A also has child D.
fn bundle_graph() -> TaskGraph {
    TaskGraph::from_tasks(vec![
        with_edge(task("A"), RelationKind::Child, "D"),
        with_edge(task("B"), RelationKind::BundleRoot, "A"),
        with_edge(task("C"), RelationKind::BundleRoot, "A"),
        with_edge(task("D"), RelationKind::Parent, "A"),
    ])
}

#[test]
fn bundle_scope_collects_members() {
    let cluster = build_cluster(&bundle_graph(), "A", BundleScope::Bundle).unwrap();
    assert_eq!(cluster.root, "A");
    assert_eq!(cluster.scope, ResolvedScope::Bundle);
    assert_eq!(cluster.members, vec!["A", "B", "C"]);
}

#[test]
fn bundle_scope_derives_root_from_member() {
    let cluster = build_cluster(&bundle_graph(), "C", BundleScope::Bundle).unwrap();
    assert_eq!(cluster.root, "A");
    assert_eq!(cluster.members, vec!["A", "B", "C"]);
}

#[test]
fn hierarchy_scope_uses_descendants() {
    let cluster = build_cluster(&bundle_graph(), "A", BundleScope::Hierarchy).unwrap();
    assert_eq!(cluster.scope, ResolvedScope::Hierarchy);
    assert_eq!(cluster.members, vec!["A", "D"]);
}

#[test]
fn auto_prefers_bundle_over_hierarchy() {
    let cluster = build_cluster(&bundle_graph(), "A", BundleScope::Auto).unwrap();
    assert_eq!(cluster.scope, ResolvedScope::Bundle);
    assert_eq!(cluster.members, vec!["A", "B", "C"]);
}

#[test]
fn auto_falls_back_to_hierarchy_then_single() {
    let graph = TaskGraph::from_tasks(vec![
        with_edge(task("P"), RelationKind::Child, "Q"),
        with_edge(task("Q"), RelationKind::Parent, "P"),
        task("lone"),
    ]);

    let cluster = build_cluster(&graph, "P", BundleScope::Auto).unwrap();
    assert_eq!(cluster.scope, ResolvedScope::Hierarchy);
    assert_eq!(cluster.members, vec!["P", "Q"]);

    let single = build_cluster(&graph, "lone", BundleScope::Auto).unwrap();
    assert_eq!(single.scope, ResolvedScope::Single);
    assert_eq!(single.members, vec!["lone"]);
}

#[test]
fn unknown_task_is_not_found() {
    let err = build_cluster(&bundle_graph(), "ghost", BundleScope::Auto).unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[test]
fn scope_parse() {
    assert_eq!("bundle".parse::<BundleScope>().unwrap(), BundleScope::Bundle);
    assert_eq!("auto".parse::<BundleScope>().unwrap(), BundleScope::Auto);
    assert!("everything".parse::<BundleScope>().is_err());
}

#[test]
fn clusters_are_deterministic() {
    let a = build_cluster(&bundle_graph(), "B", BundleScope::Auto).unwrap();
    let b = build_cluster(&bundle_graph(), "C", BundleScope::Auto).unwrap();
    assert_eq!(a.members, b.members);
    assert_eq!(a.root, b.root);
}
