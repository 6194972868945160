// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit events.
//!
//! Each stream is a JSONL file; a line's `prev_hash` is the SHA-256 of the
//! previous line's exact bytes, making the stream a verifiable chain.

use crate::actor::Actor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Well-known audit stream names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Entity state transitions.
    Transition,
    /// Evidence file writes.
    Evidence,
    /// Process lifecycle records used by actor inference.
    ProcessEvent,
    /// Non-blocking session warnings (e.g. claims in a stale session).
    SessionActivity,
}

impl EventKind {
    /// File stem of the stream under `.project/events/`.
    pub fn stream_name(&self) -> &'static str {
        match self {
            EventKind::Transition => "transitions",
            EventKind::Evidence => "evidence",
            EventKind::ProcessEvent => "process-events",
            EventKind::SessionActivity => "session-activity",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stream_name())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: DateTime<Utc>,
    pub kind: EventKind,
    pub actor: Actor,
    /// Entity the event concerns (task id, session id, ...).
    pub subject: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
}

impl AuditEvent {
    pub fn new(
        ts: DateTime<Utc>,
        kind: EventKind,
        actor: Actor,
        subject: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            ts,
            kind,
            actor,
            subject: subject.into(),
            payload,
            prev_hash: None,
        }
    }

    /// Payload for a committed state transition.
    pub fn transition_payload(from: &str, to: &str, reason: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "from": from,
            "to": to,
            "reason": reason,
        })
    }
}

/// SHA-256 hex digest of a serialized stream line.
pub fn line_hash(line: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(line.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
