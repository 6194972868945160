// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn edge(kind: RelationKind, target: &str) -> Relationship {
    Relationship::new(kind, target)
}

#[test]
fn inverse_pairs() {
    assert_eq!(
        RelationKind::DependsOn.inverse(),
        Some(RelationKind::Blocks)
    );
    assert_eq!(RelationKind::Blocks.inverse(), Some(RelationKind::DependsOn));
    assert_eq!(RelationKind::Parent.inverse(), Some(RelationKind::Child));
    assert_eq!(RelationKind::Related.inverse(), Some(RelationKind::Related));
    assert_eq!(RelationKind::BundleRoot.inverse(), None);
}

#[test]
fn normalize_dedupes_and_orders() {
    let mut edges = vec![
        edge(RelationKind::Related, "b"),
        edge(RelationKind::DependsOn, "a"),
        edge(RelationKind::Related, "b"),
    ];
    normalize(&mut edges, "t").unwrap();
    assert_eq!(
        edges,
        vec![
            edge(RelationKind::DependsOn, "a"),
            edge(RelationKind::Related, "b"),
        ]
    );
}

#[test]
fn normalize_rejects_self_edges() {
    let mut edges = vec![edge(RelationKind::Related, "t")];
    let err = normalize(&mut edges, "t").unwrap_err();
    assert_eq!(err.code(), "validation_error");
}

#[test]
fn normalize_rejects_second_parent() {
    let mut edges = vec![
        edge(RelationKind::Parent, "a"),
        edge(RelationKind::Parent, "b"),
    ];
    let err = normalize(&mut edges, "t").unwrap_err();
    assert!(err.to_string().contains("parent"));
}

#[test]
fn normalize_rejects_second_bundle_root() {
    let mut edges = vec![
        edge(RelationKind::BundleRoot, "a"),
        edge(RelationKind::BundleRoot, "b"),
    ];
    assert!(normalize(&mut edges, "t").is_err());
}

#[test]
fn targets_filters_by_kind() {
    let edges = vec![
        edge(RelationKind::DependsOn, "a"),
        edge(RelationKind::DependsOn, "b"),
        edge(RelationKind::Related, "c"),
    ];
    assert_eq!(targets(&edges, RelationKind::DependsOn), vec!["a", "b"]);
    assert_eq!(
        singular_target(&edges, RelationKind::Parent),
        None
    );
}

#[test]
fn serde_shape_is_type_and_target() {
    let json = serde_json::to_string(&edge(RelationKind::BundleRoot, "A")).unwrap();
    assert_eq!(json, r#"{"type":"bundle_root","target":"A"}"#);
}
