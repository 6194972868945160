// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-task relationship edges.
//!
//! Edges are stored as a single `relationships:` list in the task header;
//! directed kinds keep an inverse edge on the target task. Invariants:
//! no self-edges, at most one parent, at most one bundle_root.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Parent,
    Child,
    DependsOn,
    Blocks,
    Related,
    BundleRoot,
}

impl RelationKind {
    /// The edge written on the other side, if any.
    ///
    /// `related` is its own inverse; `bundle_root` has none.
    pub fn inverse(&self) -> Option<RelationKind> {
        match self {
            RelationKind::Parent => Some(RelationKind::Child),
            RelationKind::Child => Some(RelationKind::Parent),
            RelationKind::DependsOn => Some(RelationKind::Blocks),
            RelationKind::Blocks => Some(RelationKind::DependsOn),
            RelationKind::Related => Some(RelationKind::Related),
            RelationKind::BundleRoot => None,
        }
    }

    /// Kinds allowing at most one edge per task.
    pub fn is_singular(&self) -> bool {
        matches!(self, RelationKind::Parent | RelationKind::BundleRoot)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Parent => "parent",
            RelationKind::Child => "child",
            RelationKind::DependsOn => "depends_on",
            RelationKind::Blocks => "blocks",
            RelationKind::Related => "related",
            RelationKind::BundleRoot => "bundle_root",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parent" => Ok(RelationKind::Parent),
            "child" => Ok(RelationKind::Child),
            "depends_on" => Ok(RelationKind::DependsOn),
            "blocks" => Ok(RelationKind::Blocks),
            "related" => Ok(RelationKind::Related),
            "bundle_root" => Ok(RelationKind::BundleRoot),
            other => Err(Error::Validation(format!(
                "unknown relationship type: {other}"
            ))),
        }
    }
}

/// One edge in a task's relationship list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub target: String,
}

impl Relationship {
    pub fn new(kind: RelationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

/// Dedupe, reject self-edges, and order edges deterministically.
///
/// Returns `ValidationError` when a singular kind (parent, bundle_root)
/// appears with more than one distinct target.
pub fn normalize(edges: &mut Vec<Relationship>, own_id: &str) -> Result<()> {
    if edges.iter().any(|e| e.target == own_id) {
        return Err(Error::Validation(format!(
            "task {own_id} may not reference itself"
        )));
    }
    edges.sort();
    edges.dedup();
    for kind in [RelationKind::Parent, RelationKind::BundleRoot] {
        let count = edges.iter().filter(|e| e.kind == kind).count();
        if count > 1 {
            return Err(Error::Validation(format!(
                "task {own_id} has {count} {kind} edges; at most one is allowed"
            )));
        }
    }
    Ok(())
}

/// All targets of the given kind, in normalized order.
pub fn targets(edges: &[Relationship], kind: RelationKind) -> Vec<&str> {
    edges
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.target.as_str())
        .collect()
}

/// The single target of a singular kind, if present.
pub fn singular_target(edges: &[Relationship], kind: RelationKind) -> Option<&str> {
    edges
        .iter()
        .find(|e| e.kind == kind)
        .map(|e| e.target.as_str())
}

#[cfg(test)]
#[path = "relationship_tests.rs"]
mod tests;
