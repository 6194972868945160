// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! QA record entity: one row per task per validation cycle.

use crate::clock::Clock;
use crate::error::Error;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of a QA record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaState {
    Pending,
    Wip,
    Done,
    Validated,
    Rejected,
}

impl QaState {
    pub const ALL: [QaState; 5] = [
        QaState::Pending,
        QaState::Wip,
        QaState::Done,
        QaState::Validated,
        QaState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QaState::Pending => "pending",
            QaState::Wip => "wip",
            QaState::Done => "done",
            QaState::Validated => "validated",
            QaState::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QaState::Validated)
    }
}

impl fmt::Display for QaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QaState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QaState::Pending),
            "wip" => Ok(QaState::Wip),
            "done" => Ok(QaState::Done),
            "validated" => Ok(QaState::Validated),
            "rejected" => Ok(QaState::Rejected),
            other => Err(Error::Validation(format!("unknown qa state: {other}"))),
        }
    }
}

/// QA row owning the evidence directory for a task's validation rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    /// `<task-id>-qa`
    pub id: String,
    pub task_id: TaskId,
    pub state: QaState,
    /// Highest round that has been started (0 = none yet).
    #[serde(default)]
    pub round: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing)]
    pub body: String,
}

impl QaRecord {
    /// Canonical id for a task's QA record.
    pub fn id_for(task_id: &TaskId) -> String {
        format!("{}-qa", task_id)
    }

    pub fn new(task_id: TaskId, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id: Self::id_for(&task_id),
            task_id,
            state: QaState::Pending,
            round: 0,
            created_at: now,
            updated_at: now,
            extra: IndexMap::new(),
            body: String::new(),
        }
    }

    pub fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }

    /// Begin the next validation round. Rounds are contiguous from 1.
    pub fn begin_round(&mut self, clock: &dyn Clock) -> u32 {
        self.round += 1;
        self.state = QaState::Wip;
        self.touch(clock);
        self.round
    }
}

#[cfg(test)]
#[path = "qa_tests.rs"]
mod tests;
