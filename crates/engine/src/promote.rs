// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion: `done -> validated` for every member of a cluster, gated
//! by the bundle summary at the root.

use crate::ctx::EngineCtx;
use edison_core::error::Result;
use edison_core::id::IdGen;
use edison_core::state::TaskState;
use edison_graph::TaskGraph;
use edison_qa::guards::promotion_guards;
use edison_qa::scope::{build_cluster, BundleScope};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct PromoteOutcome {
    pub root: String,
    /// Members promoted to validated in this call.
    pub promoted: Vec<String>,
    /// Members skipped with the reason (wrong state).
    pub skipped: Vec<(String, String)>,
}

/// Promote the cluster containing `task_id`. Members in `done` run the
/// guarded transition; everything else is reported as skipped.
pub fn promote<G: IdGen>(
    ctx: &EngineCtx<'_, G>,
    task_id: &str,
    scope: BundleScope,
) -> Result<PromoteOutcome> {
    let graph = TaskGraph::load(ctx.tasks)?;
    let cluster = build_cluster(&graph, task_id, scope)?;
    let guard_set = promotion_guards(ctx.layout, &ctx.config.validation);
    let guard_refs = guard_set.as_refs();

    let transitions = ctx.transitions();
    let transition_ctx = ctx.transition_ctx(&transitions, Some("promotion".to_string()));

    let mut promoted = Vec::new();
    let mut skipped = Vec::new();
    for member in &cluster.members {
        let state = graph.get(member).map(|t| t.state);
        match state {
            Some(TaskState::Done) => {
                ctx.tasks.transition(
                    member,
                    TaskState::Validated,
                    &guard_refs,
                    &transition_ctx,
                    |task| {
                        // Validated tasks leave session scope.
                        if task.is_session_scoped() {
                            task.release(ctx.clock);
                        }
                    },
                )?;
                promoted.push(member.clone());
            }
            Some(TaskState::Validated) => {
                skipped.push((member.clone(), "already validated".to_string()));
            }
            Some(other) => {
                skipped.push((member.clone(), format!("in state {other}, not done")));
            }
            None => {
                skipped.push((member.clone(), "not found".to_string()));
            }
        }
    }
    info!(root = %cluster.root, promoted = promoted.len(), "promotion finished");
    Ok(PromoteOutcome {
        root: cluster.root,
        promoted,
        skipped,
    })
}

#[cfg(test)]
#[path = "promote_tests.rs"]
mod tests;
