// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity and its header attributes.

use crate::clock::Clock;
use crate::relationship::{self, RelationKind, Relationship};
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::entity_id! {
    /// Stable identifier of a task (e.g. `001-session-id-inference`).
    TaskId => "task"
}

/// A unit of work.
///
/// Persisted as one file whose location encodes its state: unclaimed tasks
/// under `.project/tasks/<state>/<id>.md`, claimed tasks under
/// `.project/sessions/<session>/<id>.md`. The header round-trips through
/// the frontmatter codec; unknown keys are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    pub state: TaskState,
    /// Session holding the claim, if any. Set iff `claimed_at` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Model hint for the agent working the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    /// Header keys this version does not interpret, preserved on re-save.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
    /// Markdown body below the header separator.
    #[serde(default, skip_serializing)]
    pub body: String,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: id.into(),
            title: title.into(),
            task_type: None,
            state: TaskState::Todo,
            session: None,
            priority: None,
            created_at: now,
            updated_at: now,
            claimed_at: None,
            last_active: None,
            continuation_id: None,
            owner: None,
            model: None,
            relationships: Vec::new(),
            extra: IndexMap::new(),
            body: String::new(),
        }
    }

    /// Record activity without changing state.
    pub fn touch(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        self.updated_at = now;
        self.last_active = Some(now);
    }

    /// Mark the task claimed into a session.
    pub fn claim(&mut self, session: impl Into<String>, continuation_id: String, clock: &dyn Clock) {
        let now = clock.now();
        self.session = Some(session.into());
        self.claimed_at = Some(now);
        self.continuation_id = Some(continuation_id);
        self.touch(clock);
    }

    /// Drop the session claim, returning the task to global scope.
    pub fn release(&mut self, clock: &dyn Clock) {
        self.session = None;
        self.claimed_at = None;
        self.touch(clock);
    }

    pub fn is_session_scoped(&self) -> bool {
        self.session.is_some()
    }

    pub fn parent(&self) -> Option<&str> {
        relationship::singular_target(&self.relationships, RelationKind::Parent)
    }

    pub fn bundle_root(&self) -> Option<&str> {
        relationship::singular_target(&self.relationships, RelationKind::BundleRoot)
    }

    pub fn children(&self) -> Vec<&str> {
        relationship::targets(&self.relationships, RelationKind::Child)
    }

    pub fn depends_on(&self) -> Vec<&str> {
        relationship::targets(&self.relationships, RelationKind::DependsOn)
    }

    pub fn blocks(&self) -> Vec<&str> {
        relationship::targets(&self.relationships, RelationKind::Blocks)
    }

    pub fn related(&self) -> Vec<&str> {
        relationship::targets(&self.relationships, RelationKind::Related)
    }

    /// Add an edge and re-normalize. Fails on self-edges or a second
    /// parent/bundle_root.
    pub fn add_relationship(&mut self, kind: RelationKind, target: &str) -> crate::Result<()> {
        self.relationships.push(Relationship::new(kind, target));
        let result = relationship::normalize(&mut self.relationships, self.id.as_str());
        if result.is_err() {
            self.relationships
                .retain(|e| !(e.kind == kind && e.target == target));
        }
        result
    }

    /// Remove an edge if present. Returns whether anything changed.
    pub fn remove_relationship(&mut self, kind: RelationKind, target: &str) -> bool {
        let before = self.relationships.len();
        self.relationships
            .retain(|e| !(e.kind == kind && e.target == target));
        self.relationships.len() != before
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
