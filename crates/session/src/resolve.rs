// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical session-id resolver.
//!
//! One ordered pipeline; the first source that yields a valid, existing
//! session wins:
//!
//! 1. explicit argument
//! 2. `AGENTS_SESSION`
//! 3. `.session-id` file (linked worktrees only)
//! 4. process-tree derivation
//! 5. owner-pid lookup among existing sessions
//!
//! Resolution fails open: when the outcome would be a guess, it returns
//! `Unresolved` with a message that teaches the intended usage.

use crate::process::{classify, ProcessClass, ProcessInspector};
use edison_core::error::{Error, Result};
use edison_core::session::Session;
use edison_storage::{Layout, SessionStore};
use serde::Serialize;
use tracing::{debug, warn};

/// Maximum ancestors walked during process-tree derivation.
const MAX_ANCESTORS: usize = 32;

/// Which pipeline source produced the winning id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Explicit,
    Env,
    WorktreeFile,
    ProcessTree,
    OwnerLookup,
}

/// Outcome of session-id resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved {
        id: String,
        source: ResolutionSource,
    },
    Unresolved {
        reason: String,
    },
}

impl Resolution {
    pub fn id(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { id, .. } => Some(id),
            Resolution::Unresolved { .. } => None,
        }
    }

    /// Convert to a hard error for callers that need a session.
    pub fn require(self) -> Result<String> {
        match self {
            Resolution::Resolved { id, .. } => Ok(id),
            Resolution::Unresolved { reason } => Err(Error::Resolution(reason)),
        }
    }
}

/// Resolver over the session store and a process inspector.
pub struct SessionResolver<'a> {
    layout: &'a Layout,
    store: &'a SessionStore,
    inspector: &'a dyn ProcessInspector,
}

impl<'a> SessionResolver<'a> {
    pub fn new(
        layout: &'a Layout,
        store: &'a SessionStore,
        inspector: &'a dyn ProcessInspector,
    ) -> Self {
        Self {
            layout,
            store,
            inspector,
        }
    }

    /// Run the pipeline. `env_session` is the value of `AGENTS_SESSION`.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        env_session: Option<&str>,
    ) -> Result<Resolution> {
        // 1. Explicit argument: authoritative, so a missing session is an
        // error rather than a fallthrough.
        if let Some(id) = explicit {
            if self.store.exists(id) {
                return Ok(Resolution::Resolved {
                    id: id.to_string(),
                    source: ResolutionSource::Explicit,
                });
            }
            return Err(Error::Resolution(format!(
                "session {id} does not exist; omit --session unless resuming an existing one"
            )));
        }

        // 2. Environment hint.
        if let Some(id) = env_session {
            if self.store.exists(id) {
                return Ok(Resolution::Resolved {
                    id: id.to_string(),
                    source: ResolutionSource::Env,
                });
            }
            warn!(session = id, "AGENTS_SESSION names a missing session; ignoring");
        }

        // 3. Worktree marker file. Ignored in the primary checkout.
        if self.layout.is_linked_worktree() {
            if let Some(content) =
                edison_storage::atomic::read_text_optional(&self.layout.session_id_file())?
            {
                let id = content.trim();
                if !id.is_empty() && self.store.exists(id) {
                    return Ok(Resolution::Resolved {
                        id: id.to_string(),
                        source: ResolutionSource::WorktreeFile,
                    });
                }
            }
        }

        // 4. Process-tree derivation.
        if !self.inspector.available() {
            return Ok(Resolution::Unresolved {
                reason: "process inspection is unavailable, so the session cannot be inferred; \
                         pass --session or set AGENTS_SESSION"
                    .to_string(),
            });
        }
        let ancestors = self.ancestors();
        if let Some(prefix) = derive_prefix(&ancestors, self.inspector) {
            debug!(prefix = %prefix, "derived session prefix from process tree");
            if let Some(session) = self.pick_by_prefix(&prefix)? {
                return Ok(Resolution::Resolved {
                    id: session.id.to_string(),
                    source: ResolutionSource::ProcessTree,
                });
            }
        }

        // 5. Owner-pid lookup, best effort.
        if let Some(session) = self.pick_by_owner(&ancestors)? {
            return Ok(Resolution::Resolved {
                id: session.id.to_string(),
                source: ResolutionSource::OwnerLookup,
            });
        }

        Ok(Resolution::Unresolved {
            reason: "no existing session matches this process; run `edison session create` \
                     first, or omit --session unless resuming"
                .to_string(),
        })
    }

    /// Derive the `{process}-pid-{pid}` prefix without consulting stored
    /// sessions (used by `session create`).
    pub fn derive_prefix(&self) -> Option<String> {
        if !self.inspector.available() {
            return None;
        }
        derive_prefix(&self.ancestors(), self.inspector)
    }

    /// Ancestor pids starting at the current process, bounded.
    pub fn ancestors(&self) -> Vec<u32> {
        let mut pids = vec![self.inspector.current_pid()];
        while pids.len() < MAX_ANCESTORS {
            match self.inspector.parent_of(*pids.last().unwrap_or(&0)) {
                Some(parent) if parent != 0 && !pids.contains(&parent) => pids.push(parent),
                _ => break,
            }
        }
        pids
    }

    /// Among sessions whose id is exactly `prefix` or starts with
    /// `"{prefix}-seq-"`: prefer semantically active states, then the
    /// most recently updated.
    fn pick_by_prefix(&self, prefix: &str) -> Result<Option<Session>> {
        let seq_prefix = format!("{prefix}-seq-");
        let candidates: Vec<Session> = self
            .store
            .list()?
            .into_iter()
            .filter(|s| s.id == *prefix || s.id.as_str().starts_with(&seq_prefix))
            .collect();
        Ok(pick_candidate(candidates))
    }

    fn pick_by_owner(&self, ancestors: &[u32]) -> Result<Option<Session>> {
        let candidates: Vec<Session> = self
            .store
            .list()?
            .into_iter()
            .filter(|s| s.owner_pid.map(|p| ancestors.contains(&p)).unwrap_or(false))
            .collect();
        Ok(pick_candidate(candidates))
    }
}

/// Tie-break: active states first, then the most recently active.
fn pick_candidate(mut candidates: Vec<Session>) -> Option<Session> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| {
        let active_a = a.state.is_semantically_active();
        let active_b = b.state.is_semantically_active();
        active_b
            .cmp(&active_a)
            .then(b.last_active.cmp(&a.last_active))
            .then(a.id.cmp(&b.id))
    });
    candidates.into_iter().next()
}

/// Walk the ancestor chain and derive `{process}-pid-{pid}`.
///
/// Preference order: the highest (topmost) known LLM wrapper; else the
/// highest Edison-classified process; else the current process.
fn derive_prefix(ancestors: &[u32], inspector: &dyn ProcessInspector) -> Option<String> {
    let mut top_wrapper: Option<(String, u32)> = None;
    let mut top_edison: Option<u32> = None;
    for pid in ancestors {
        let Some(info) = inspector.process(*pid) else {
            continue;
        };
        match classify(&info) {
            ProcessClass::LlmWrapper(name) => top_wrapper = Some((name, *pid)),
            ProcessClass::Edison => top_edison = Some(*pid),
            ProcessClass::Other => {}
        }
    }
    if let Some((name, pid)) = top_wrapper {
        return Some(format!("{name}-pid-{pid}"));
    }
    if let Some(pid) = top_edison {
        return Some(format!("edison-pid-{pid}"));
    }
    let current = ancestors.first()?;
    let info = inspector.process(*current)?;
    let name = info.name.to_lowercase();
    Some(format!("{name}-pid-{current}"))
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
