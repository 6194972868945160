// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actor identity resolution.
//!
//! Environment first (`EDISON_ACTOR_KIND`, `EDISON_ACTOR_ID`), then a
//! bounded tail-scan of the process-events stream matching the topmost
//! ancestor pid. Read-only and fail-open: hook code may call this freely
//! and gets `unknown` rather than an error.

use crate::process::ProcessInspector;
use crate::resolve::SessionResolver;
use edison_core::actor::{Actor, ActorKind};
use edison_storage::{EventLog, Layout, SessionStore};
use tracing::debug;

/// Records scanned from the end of the process-events stream.
const TAIL_SCAN_LIMIT: usize = 200;

/// Resolve the caller's identity.
///
/// `env_kind`/`env_id` are the values of `EDISON_ACTOR_KIND` and
/// `EDISON_ACTOR_ID`.
pub fn resolve_actor(
    layout: &Layout,
    store: &SessionStore,
    inspector: &dyn ProcessInspector,
    process_events: &EventLog,
    env_kind: Option<&str>,
    env_id: Option<&str>,
) -> Actor {
    if let Some(kind) = env_kind {
        let kind = kind.parse::<ActorKind>().unwrap_or_default();
        return Actor::new(kind, env_id.map(|s| s.to_string()));
    }

    // Tail-scan fallback: match the topmost ancestor pid against recent
    // process records.
    if inspector.available() {
        let resolver = SessionResolver::new(layout, store, inspector);
        let ancestors = resolver.ancestors();
        if let Some(topmost) = ancestors.last() {
            if let Ok(events) = process_events.tail(TAIL_SCAN_LIMIT) {
                for event in events.iter().rev() {
                    let pid = event.payload.get("pid").and_then(|v| v.as_u64());
                    if pid == Some(u64::from(*topmost)) {
                        let kind = event
                            .payload
                            .get("actor_kind")
                            .and_then(|v| v.as_str())
                            .and_then(|s| s.parse::<ActorKind>().ok())
                            .unwrap_or_default();
                        let id = event
                            .payload
                            .get("actor_id")
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string());
                        debug!(pid = topmost, kind = %kind, "actor resolved from process events");
                        return Actor::new(kind, id);
                    }
                }
            }
        }
    }

    Actor::unknown()
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
