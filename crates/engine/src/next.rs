// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `session next`: the continuation contract.
//!
//! Pure computation over the session, its tasks, the graph, and QA
//! state; it never mutates entities. The hook-facing entry point is
//! fail-open: unexpected errors degrade to a conservative payload with
//! the reason attached instead of crashing the caller.

use crate::ctx::EngineCtx;
use edison_core::config::CompletionPolicy;
use edison_core::error::Result;
use edison_core::event::{AuditEvent, EventKind};
use edison_core::id::IdGen;
use edison_core::session::{ContinuationMode, Session};
use edison_core::state::TaskState;
use edison_core::task::Task;
use edison_graph::{ready_tasks, TaskGraph};
use edison_qa::summary::BundleSummary;
use edison_storage::EventLog;
use serde::Serialize;
use tracing::warn;

/// One ordered hint for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAction {
    pub kind: String,
    pub command: String,
    pub subject: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub is_complete: bool,
    pub policy: CompletionPolicy,
    pub reasons_incomplete: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Continuation {
    pub mode: ContinuationMode,
    pub should_continue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// The stable `session next` JSON shape.
#[derive(Debug, Clone, Serialize)]
pub struct NextPayload {
    pub session: String,
    pub actions: Vec<NextAction>,
    pub blockers: Vec<String>,
    pub reports_missing: Vec<String>,
    pub completion: Completion,
    pub continuation: Continuation,
}

/// Fail-open entry point for hooks and the CLI.
pub fn session_next<G: IdGen>(ctx: &EngineCtx<'_, G>, session_id: &str) -> NextPayload {
    match compute(ctx, session_id) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(session = session_id, error = %e, "session-next degraded");
            let activity = EventLog::new(ctx.layout.stream_file(EventKind::SessionActivity));
            let _ = activity.append(AuditEvent::new(
                ctx.clock.now(),
                EventKind::SessionActivity,
                ctx.actor.clone(),
                session_id,
                serde_json::json!({"error": e.to_string(), "op": "session-next"}),
            ));
            NextPayload {
                session: session_id.to_string(),
                actions: vec![NextAction {
                    kind: "status".to_string(),
                    command: "edison session status".to_string(),
                    subject: session_id.to_string(),
                    reason: "inspect the session after an internal failure".to_string(),
                }],
                blockers: Vec::new(),
                reports_missing: Vec::new(),
                completion: Completion {
                    is_complete: false,
                    policy: ctx.config.continuation.completion_policy,
                    reasons_incomplete: vec![format!("session-next failed: {e}")],
                },
                continuation: Continuation {
                    mode: ContinuationMode::Off,
                    should_continue: false,
                    prompt: None,
                },
            }
        }
    }
}

fn compute<G: IdGen>(ctx: &EngineCtx<'_, G>, session_id: &str) -> Result<NextPayload> {
    let session = ctx.sessions.load(session_id)?;
    let graph = TaskGraph::load(ctx.tasks)?;
    let session_tasks: Vec<&Task> = graph
        .tasks()
        .filter(|t| t.session.as_deref() == Some(session_id))
        .collect();

    let mut actions: Vec<NextAction> = Vec::new();
    let mut blockers = Vec::new();
    let mut reports_missing = Vec::new();

    for task in &session_tasks {
        match task.state {
            TaskState::Wip => actions.push(NextAction {
                kind: "work".to_string(),
                command: format!("edison task done {}", task.id),
                subject: task.id.to_string(),
                reason: "claimed task is in progress".to_string(),
            }),
            TaskState::Blocked => blockers.push(format!("task {} is blocked", task.id)),
            TaskState::Done => {
                describe_done_task(ctx, task, &mut actions, &mut reports_missing)?;
            }
            _ => {}
        }
    }

    let satisfied = &ctx.config.validation.dependency_satisfied_states;
    if let Some(ready) = ready_tasks(&graph, satisfied).first() {
        actions.push(NextAction {
            kind: "claim".to_string(),
            command: format!("edison task claim {}", ready.id),
            subject: ready.id.to_string(),
            reason: "ready task available".to_string(),
        });
    }

    if actions.is_empty() {
        actions.push(NextAction {
            kind: "status".to_string(),
            command: "edison task ready".to_string(),
            subject: session_id.to_string(),
            reason: "no actionable task; inspect the backlog".to_string(),
        });
    }
    actions.dedup_by(|a, b| a.kind == b.kind && a.subject == b.subject);

    let (policy_ok, mut reasons) = evaluate_completion(ctx, &graph, &session_tasks);
    if !blockers.is_empty() {
        reasons.push(format!("{} blocker(s) outstanding", blockers.len()));
    }
    if !reports_missing.is_empty() {
        reasons.push(format!("{} report(s) missing", reports_missing.len()));
    }
    let is_complete = policy_ok && blockers.is_empty() && reports_missing.is_empty();

    let mode = effective_mode(ctx, &session);
    let should_continue = mode != ContinuationMode::Off && !is_complete;
    let prompt = should_continue.then(|| {
        let action = actions
            .first()
            .map(|a| a.command.clone())
            .unwrap_or_else(|| "edison task ready".to_string());
        ctx.config
            .continuation
            .templates
            .prompt
            .replace("${session}", session_id)
            .replace("${command}", &format!("edison session next {session_id}"))
            .replace("${action}", &action)
    });

    Ok(NextPayload {
        session: session_id.to_string(),
        actions,
        blockers,
        reports_missing,
        completion: Completion {
            is_complete,
            policy: ctx.config.continuation.completion_policy,
            reasons_incomplete: if is_complete { Vec::new() } else { reasons },
        },
        continuation: Continuation {
            mode,
            should_continue,
            prompt,
        },
    })
}

/// Done tasks either need validation, evidence, or promotion.
fn describe_done_task<G: IdGen>(
    ctx: &EngineCtx<'_, G>,
    task: &Task,
    actions: &mut Vec<NextAction>,
    reports_missing: &mut Vec<String>,
) -> Result<()> {
    let root = task.bundle_root().unwrap_or(task.id.as_str()).to_string();
    match BundleSummary::load_latest_for(ctx.layout, &root)? {
        None => {
            reports_missing.push(
                BundleSummary::path(ctx.layout, &root, 1)
                    .to_string_lossy()
                    .into_owned(),
            );
            actions.push(NextAction {
                kind: "validate".to_string(),
                command: format!("edison qa validate {root} --execute"),
                subject: root,
                reason: format!("task {} has no validation round", task.id),
            });
        }
        Some(summary) if !summary.approved => {
            actions.push(NextAction {
                kind: "validate".to_string(),
                command: format!("edison qa validate {root} --execute"),
                subject: root.clone(),
                reason: format!(
                    "round {} not approved (missing: {})",
                    summary.round,
                    summary.missing.join(", ")
                ),
            });
        }
        Some(summary) => {
            let round_dir = ctx.layout.round_dir(&summary.root_task, summary.round);
            let preset = ctx.config.validation.preset(&summary.preset)?;
            let mut evidence_gap = false;
            for file in &preset.required_evidence {
                let path = round_dir.join(file);
                if !path.is_file() && (summary.preset != "quick" || file == "implementation-report.md")
                {
                    evidence_gap = true;
                    reports_missing.push(path.to_string_lossy().into_owned());
                }
            }
            if !evidence_gap {
                actions.push(NextAction {
                    kind: "promote".to_string(),
                    command: format!("edison qa promote {}", task.id),
                    subject: task.id.to_string(),
                    reason: "bundle approved; promotion available".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Policy evaluation over the session's claimed tasks.
fn evaluate_completion<G: IdGen>(
    ctx: &EngineCtx<'_, G>,
    graph: &TaskGraph,
    session_tasks: &[&Task],
) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();
    if session_tasks.is_empty() {
        reasons.push("no tasks claimed in this session".to_string());
        return (false, reasons);
    }
    let settled = |state: TaskState| matches!(state, TaskState::Validated | TaskState::Archived);
    let at_least_done = |state: TaskState| {
        matches!(
            state,
            TaskState::Done | TaskState::Validated | TaskState::Archived
        )
    };

    for task in session_tasks {
        let ok = match ctx.config.continuation.completion_policy {
            CompletionPolicy::AllTasksValidated => settled(task.state),
            CompletionPolicy::ParentValidatedChildrenDone => {
                let has_claimed_parent = task
                    .parent()
                    .and_then(|p| graph.get(p))
                    .map(|p| p.session == task.session)
                    .unwrap_or(false);
                if has_claimed_parent {
                    at_least_done(task.state)
                } else {
                    settled(task.state)
                }
            }
        };
        if !ok {
            reasons.push(format!("task {} is {}", task.id, task.state));
        }
    }
    (reasons.is_empty(), reasons)
}

/// Mode merge order: project default, then per-session override, then
/// per-platform override. Last writer wins.
fn effective_mode<G: IdGen>(ctx: &EngineCtx<'_, G>, session: &Session) -> ContinuationMode {
    if !ctx.config.continuation.enabled {
        return ContinuationMode::Off;
    }
    let mut mode = ctx.config.continuation.default_mode;
    if let Some(session_mode) = session.continuation.mode {
        mode = session_mode;
    }
    if let Some(platform) = &session.platform {
        if let Some(overrides) = ctx.config.continuation.platform_overrides.get(platform) {
            if let Some(platform_mode) = overrides.mode {
                mode = platform_mode;
            }
        }
    }
    mode
}

#[cfg(test)]
#[path = "next_tests.rs"]
mod tests;
