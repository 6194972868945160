// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entity: an orchestration context holding task claims.
//!
//! Session ids follow `<process>-pid-<pid>[-seq-N]`; the `-seq-N` suffix
//! disambiguates multiple sessions sharing a topmost process. Staleness is
//! derived from `last_active`, never stored.

use crate::clock::Clock;
use crate::error::Error;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::entity_id! {
    /// Identifier of a session (`claude-pid-12345`, `claude-pid-12345-seq-1`).
    SessionId => "session"
}

/// Stored state of a session.
///
/// `stale` is intentionally absent: it is computed from `last_active`
/// against the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Closing,
    Closed,
    Archived,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
            SessionState::Archived => "archived",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Archived)
    }

    /// States in which the session can hold claims.
    pub fn is_semantically_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionState::Active),
            "closing" => Ok(SessionState::Closing),
            "closed" => Ok(SessionState::Closed),
            "archived" => Ok(SessionState::Archived),
            other => Err(Error::Validation(format!("unknown session state: {other}"))),
        }
    }
}

/// Continuation loop mode for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationMode {
    #[default]
    Off,
    Soft,
    Hard,
}

impl fmt::Display for ContinuationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuationMode::Off => f.write_str("off"),
            ContinuationMode::Soft => f.write_str("soft"),
            ContinuationMode::Hard => f.write_str("hard"),
        }
    }
}

impl FromStr for ContinuationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ContinuationMode::Off),
            "soft" => Ok(ContinuationMode::Soft),
            "hard" => Ok(ContinuationMode::Hard),
            other => Err(Error::Validation(format!(
                "unknown continuation mode: {other} (expected off, soft, or hard)"
            ))),
        }
    }
}

/// Per-session continuation override. The schema is strict: unknown keys
/// are rejected at load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContinuationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ContinuationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_blocked: Option<bool>,
}

impl ContinuationSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// An orchestration context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    /// Client platform hint (claude, cursor, codex, opencode, pal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Topmost process the id was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_pid: Option<u32>,
    #[serde(default, skip_serializing_if = "ContinuationSettings::is_empty")]
    pub continuation: ContinuationSettings,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing)]
    pub body: String,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: id.into(),
            state: SessionState::Active,
            created_at: now,
            last_active: now,
            base_branch: None,
            worktree: None,
            platform: None,
            owner_pid: None,
            continuation: ContinuationSettings::default(),
            extra: IndexMap::new(),
            body: String::new(),
        }
    }

    pub fn touch(&mut self, clock: &dyn Clock) {
        self.last_active = clock.now();
    }

    /// Derived staleness: `now - last_active > threshold`.
    pub fn is_stale(&self, clock: &dyn Clock, stale_after_seconds: u64) -> bool {
        let elapsed_ms = clock
            .epoch_ms()
            .saturating_sub(self.last_active.timestamp_millis().max(0) as u64);
        elapsed_ms > stale_after_seconds.saturating_mul(1000)
    }

    /// The id prefix without any `-seq-N` suffix.
    pub fn id_prefix(&self) -> &str {
        match self.id.as_str().rfind("-seq-") {
            Some(pos) => &self.id.as_str()[..pos],
            None => self.id.as_str(),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
