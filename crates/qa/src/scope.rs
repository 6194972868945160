// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle scope resolution: which tasks validate together.

use edison_core::error::{Error, Result};
use edison_graph::TaskGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-requested clustering scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleScope {
    Hierarchy,
    Bundle,
    #[default]
    Auto,
}

impl FromStr for BundleScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hierarchy" => Ok(BundleScope::Hierarchy),
            "bundle" => Ok(BundleScope::Bundle),
            "auto" => Ok(BundleScope::Auto),
            other => Err(Error::Validation(format!(
                "unknown scope: {other} (expected hierarchy, bundle, or auto)"
            ))),
        }
    }
}

/// What `auto` (or an explicit request) actually resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedScope {
    Hierarchy,
    Bundle,
    Single,
}

impl fmt::Display for ResolvedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedScope::Hierarchy => f.write_str("hierarchy"),
            ResolvedScope::Bundle => f.write_str("bundle"),
            ResolvedScope::Single => f.write_str("single"),
        }
    }
}

/// A resolved validation cluster. `members` includes the root, ordered
/// id ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub root: String,
    pub scope: ResolvedScope,
    pub members: Vec<String>,
}

/// Resolve the cluster for a task under the requested scope.
///
/// Passing a non-root member with a `bundle_root` derives the root; the
/// cluster is deterministic for a fixed input.
pub fn build_cluster(graph: &TaskGraph, task_id: &str, scope: BundleScope) -> Result<Cluster> {
    let task = graph
        .get(task_id)
        .ok_or_else(|| Error::not_found("task", task_id))?;

    match scope {
        BundleScope::Hierarchy => {
            let root = task_id.to_string();
            Ok(cluster_of(
                root.clone(),
                ResolvedScope::Hierarchy,
                graph.descendants(&root),
            ))
        }
        BundleScope::Bundle => {
            let root = task.bundle_root().unwrap_or(task_id).to_string();
            if graph.get(&root).is_none() {
                return Err(Error::not_found("task", root));
            }
            Ok(cluster_of(
                root.clone(),
                ResolvedScope::Bundle,
                graph.bundle_members(&root),
            ))
        }
        BundleScope::Auto => {
            let root = task.bundle_root().unwrap_or(task_id).to_string();
            let bundle = graph.bundle_members(&root);
            if !bundle.is_empty() && graph.get(&root).is_some() {
                return Ok(cluster_of(root, ResolvedScope::Bundle, bundle));
            }
            let descendants = graph.descendants(task_id);
            if !descendants.is_empty() {
                return Ok(cluster_of(
                    task_id.to_string(),
                    ResolvedScope::Hierarchy,
                    descendants,
                ));
            }
            Ok(cluster_of(task_id.to_string(), ResolvedScope::Single, Vec::new()))
        }
    }
}

fn cluster_of(root: String, scope: ResolvedScope, mut members: Vec<String>) -> Cluster {
    members.push(root.clone());
    members.sort();
    members.dedup();
    Cluster {
        root,
        scope,
        members,
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
