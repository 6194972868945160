// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim, complete, and release.
//!
//! A claim checks readiness against the relationship graph, moves the
//! task file into the session directory, refreshes the session, and
//! appends one transition event. Staleness warns (to the
//! session-activity stream) unless `session.recovery.block_on_stale`
//! turns it into a denial.

use crate::ctx::EngineCtx;
use edison_core::error::{Error, Result};
use edison_core::id::IdGen;
use edison_core::machine::{guards, FnGuard, GuardOutcome};
use edison_core::state::TaskState;
use edison_core::task::Task;
use edison_graph::TaskGraph;
use edison_session::SessionManager;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// The claim's authoritative-location answer.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub id: String,
    pub state: TaskState,
    pub session: String,
    /// Repo-relative path of the task file after the move.
    pub path: String,
}

fn relative_to_root(layout_root: &Path, path: &Path) -> String {
    path.strip_prefix(layout_root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Claim a ready todo task into a session.
pub fn claim_task<G: IdGen>(
    ctx: &EngineCtx<'_, G>,
    session_id: &str,
    task_id: &str,
) -> Result<ClaimOutcome> {
    let session = ctx.sessions.load(session_id)?;
    let manager = SessionManager::new(ctx.layout, ctx.sessions, ctx.tasks, ctx.config, ctx.clock);

    if manager.is_stale(&session) {
        if ctx.config.session.recovery.block_on_stale {
            return Err(Error::TransitionBlocked {
                guard: "sessionNotStale".to_string(),
                reason: format!(
                    "session {session_id} is stale; run `edison session resume {session_id}` \
                     or `edison session cleanup-stale {session_id}`"
                ),
            });
        }
        manager.record_activity_warning(
            session_id,
            &format!("claim of {task_id} in stale session"),
            &ctx.actor,
        )?;
    }

    // Readiness is checked up front so the caller gets the dedicated
    // error with a suggested next step.
    let graph = TaskGraph::load(ctx.tasks)?;
    let task = graph
        .get(task_id)
        .ok_or_else(|| Error::not_found("task", task_id))?;
    let readiness = graph.readiness(task, &ctx.config.validation.dependency_satisfied_states);
    if !readiness.ready {
        return Err(Error::DependenciesUnsatisfied {
            task: task_id.to_string(),
            unmet: readiness.unmet,
        });
    }

    let ready_guard: FnGuard<Task> = FnGuard::new(guards::DEPENDENCIES_SATISFIED, move |_| {
        // Re-verified above under the same invocation; the graph cannot
        // regress between the check and the locked transition because
        // dependency states only move forward.
        GuardOutcome::Allow
    });

    let transitions = ctx.transitions();
    let transition_ctx = ctx.transition_ctx(&transitions, Some(format!("claimed by {session_id}")));
    let continuation_id = ctx.id_gen.next();
    let outcome = ctx.tasks.transition(
        task_id,
        TaskState::Wip,
        &[&ready_guard],
        &transition_ctx,
        |task| task.claim(session_id, continuation_id, ctx.clock),
    )?;

    manager.touch(session_id)?;
    info!(task = task_id, session = session_id, "task claimed");
    Ok(ClaimOutcome {
        id: task_id.to_string(),
        state: outcome.entity.state,
        session: session_id.to_string(),
        path: relative_to_root(ctx.layout.root(), &outcome.path),
    })
}

/// Mark a claimed task done (stays session-scoped until promotion).
pub fn complete_task<G: IdGen>(
    ctx: &EngineCtx<'_, G>,
    session_id: &str,
    task_id: &str,
) -> Result<ClaimOutcome> {
    let transitions = ctx.transitions();
    let transition_ctx = ctx.transition_ctx(&transitions, Some("work complete".to_string()));
    let outcome = ctx
        .tasks
        .transition(task_id, TaskState::Done, &[], &transition_ctx, |_| {})?;
    let manager = SessionManager::new(ctx.layout, ctx.sessions, ctx.tasks, ctx.config, ctx.clock);
    manager.touch(session_id)?;
    Ok(ClaimOutcome {
        id: task_id.to_string(),
        state: outcome.entity.state,
        session: session_id.to_string(),
        path: relative_to_root(ctx.layout.root(), &outcome.path),
    })
}

/// Reclaim: return a wip task to the global todo pool.
pub fn release_task<G: IdGen>(ctx: &EngineCtx<'_, G>, task_id: &str) -> Result<ClaimOutcome> {
    let transitions = ctx.transitions();
    let transition_ctx = ctx.transition_ctx(&transitions, Some("released".to_string()));
    let outcome = ctx
        .tasks
        .transition(task_id, TaskState::Todo, &[], &transition_ctx, |task| {
            task.release(ctx.clock)
        })?;
    Ok(ClaimOutcome {
        id: task_id.to_string(),
        state: outcome.entity.state,
        session: String::new(),
        path: relative_to_root(ctx.layout.root(), &outcome.path),
    })
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;
