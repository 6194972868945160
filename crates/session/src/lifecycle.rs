// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: create, touch, resume, staleness, cleanup.
//!
//! Staleness is a UX hint derived from `last_active`; it never blocks
//! claims unless `session.recovery.block_on_stale` is enabled. Cleanup is
//! explicit and destructive: outstanding claims are restored to global
//! state and the session is archived.

use edison_core::actor::Actor;
use edison_core::clock::Clock;
use edison_core::config::EdisonConfig;
use edison_core::error::Result;
use edison_core::event::{AuditEvent, EventKind};
use edison_core::session::{Session, SessionState};
use edison_core::state::TaskState;
use edison_storage::{EventLog, Layout, SessionStore, TaskStore, TransitionCtx};
use serde::Serialize;
use tracing::info;

/// Result of `cleanup-stale`.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub session: String,
    /// Task ids restored to global scope.
    pub restored: Vec<String>,
    pub state: SessionState,
}

/// Session operations over the stores.
pub struct SessionManager<'a> {
    layout: &'a Layout,
    store: &'a SessionStore,
    tasks: &'a TaskStore,
    config: &'a EdisonConfig,
    clock: &'a dyn Clock,
}

impl<'a> SessionManager<'a> {
    pub fn new(
        layout: &'a Layout,
        store: &'a SessionStore,
        tasks: &'a TaskStore,
        config: &'a EdisonConfig,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            layout,
            store,
            tasks,
            config,
            clock,
        }
    }

    fn transitions(&self) -> EventLog {
        EventLog::new(self.layout.stream_file(EventKind::Transition))
    }

    fn activity(&self) -> EventLog {
        EventLog::new(self.layout.stream_file(EventKind::SessionActivity))
    }

    fn process_events(&self) -> EventLog {
        EventLog::new(self.layout.stream_file(EventKind::ProcessEvent))
    }

    /// Create a session from a derived prefix, allocating a `-seq-N`
    /// suffix when the prefix is already taken.
    pub fn create(
        &self,
        prefix: &str,
        platform: Option<String>,
        owner_pid: Option<u32>,
        actor: &Actor,
    ) -> Result<Session> {
        let id = self.allocate_id(prefix)?;
        let mut session = Session::new(id.as_str(), self.clock);
        session.platform = platform;
        session.owner_pid = owner_pid;
        if self.layout.is_linked_worktree() {
            session.worktree = Some(self.layout.root().to_string_lossy().into_owned());
            edison_storage::atomic::write_text(
                &self.layout.session_id_file(),
                &format!("{id}\n"),
            )?;
        }
        self.store.save(&session)?;

        self.process_events().append(AuditEvent::new(
            self.clock.now(),
            EventKind::ProcessEvent,
            actor.clone(),
            id.clone(),
            serde_json::json!({
                "pid": owner_pid,
                "actor_kind": actor.kind.to_string(),
                "actor_id": actor.id,
                "event": "session-created",
            }),
        ))?;
        info!(session = %id, "session created");
        Ok(session)
    }

    /// Next free id for a prefix: the bare prefix, then `-seq-1`, `-seq-2`, ...
    pub fn allocate_id(&self, prefix: &str) -> Result<String> {
        let seq_prefix = format!("{prefix}-seq-");
        let mut max_seq: Option<u32> = None;
        for session in self.store.list()? {
            let id = session.id.as_str();
            if id == prefix {
                max_seq = max_seq.max(Some(0));
            } else if let Some(rest) = id.strip_prefix(&seq_prefix) {
                if let Ok(n) = rest.parse::<u32>() {
                    max_seq = max_seq.max(Some(n));
                }
            }
        }
        Ok(match max_seq {
            None => prefix.to_string(),
            Some(n) => format!("{prefix}-seq-{}", n + 1),
        })
    }

    /// Record activity on the session (claims, transitions).
    pub fn touch(&self, id: &str) -> Result<Session> {
        let mut session = self.store.load(id)?;
        session.touch(self.clock);
        self.store.save(&session)?;
        Ok(session)
    }

    /// Derived staleness against the configured threshold.
    pub fn is_stale(&self, session: &Session) -> bool {
        session.is_stale(self.clock, self.config.session.recovery.stale_after_seconds)
    }

    /// Active sessions past the inactivity threshold.
    pub fn stale_sessions(&self) -> Result<Vec<Session>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|s| s.state == SessionState::Active && self.is_stale(s))
            .collect())
    }

    /// Append a non-blocking warning to the session-activity stream.
    pub fn record_activity_warning(
        &self,
        session: &str,
        message: &str,
        actor: &Actor,
    ) -> Result<()> {
        self.activity().append(AuditEvent::new(
            self.clock.now(),
            EventKind::SessionActivity,
            actor.clone(),
            session,
            serde_json::json!({"warning": message}),
        ))?;
        Ok(())
    }

    /// Re-enter a session: refresh activity and, in linked worktrees,
    /// persist `.session-id` for later inference.
    pub fn resume(&self, id: &str) -> Result<Session> {
        let session = self.touch(id)?;
        if self.layout.is_linked_worktree() {
            edison_storage::atomic::write_text(
                &self.layout.session_id_file(),
                &format!("{id}\n"),
            )?;
        }
        Ok(session)
    }

    /// Explicit, destructive cleanup: restore outstanding claims to
    /// global state and archive the session. `cleanup-expired` is an
    /// alias for this operation.
    pub fn cleanup_stale(&self, id: &str, actor: &Actor) -> Result<CleanupReport> {
        let session = self.store.load(id)?;
        let transitions = self.transitions();
        let ctx = TransitionCtx {
            actor: actor.clone(),
            reason: Some("session cleanup".to_string()),
            clock: self.clock,
            transitions: &transitions,
        };

        let mut restored = Vec::new();
        for task in self.tasks.list_session(id)? {
            let task_id = task.id.to_string();
            if task.state == TaskState::Wip {
                // Reclaim: wip -> todo, dropping the session scope.
                self.tasks
                    .transition(&task_id, TaskState::Todo, &[], &ctx, |t| {
                        t.release(self.clock)
                    })?;
            } else {
                let mut released = task;
                released.release(self.clock);
                self.tasks.save(&released)?;
            }
            restored.push(task_id);
        }

        // Walk the full lifecycle; no shortcut past closing.
        let mut state = session.state;
        if state == SessionState::Active {
            state = self
                .store
                .transition(id, SessionState::Closing, &ctx)?
                .entity
                .state;
        }
        if state == SessionState::Closing {
            state = self
                .store
                .transition(id, SessionState::Closed, &ctx)?
                .entity
                .state;
        }
        if state == SessionState::Closed {
            state = self
                .store
                .transition(id, SessionState::Archived, &ctx)?
                .entity
                .state;
        }
        info!(session = id, restored = restored.len(), "session cleaned up");
        Ok(CleanupReport {
            session: id.to_string(),
            restored,
            state,
        })
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
