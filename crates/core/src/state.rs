// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle states.
//!
//! A task's state always matches the directory its file resides in
//! (`.project/tasks/<state>/`), except while claimed into a session.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of a task in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Todo,
    Wip,
    Blocked,
    Done,
    Validated,
    Archived,
}

impl TaskState {
    /// All states in canonical directory-discovery order.
    pub const ALL: [TaskState; 6] = [
        TaskState::Todo,
        TaskState::Wip,
        TaskState::Blocked,
        TaskState::Done,
        TaskState::Validated,
        TaskState::Archived,
    ];

    /// Directory name under `.project/tasks/` for this state.
    pub fn dir_name(&self) -> &'static str {
        self.as_str()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Todo => "todo",
            TaskState::Wip => "wip",
            TaskState::Blocked => "blocked",
            TaskState::Done => "done",
            TaskState::Validated => "validated",
            TaskState::Archived => "archived",
        }
    }

    /// Terminal states reject all transitions except a declared reopen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Archived)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskState::Todo),
            "wip" => Ok(TaskState::Wip),
            "blocked" => Ok(TaskState::Blocked),
            "done" => Ok(TaskState::Done),
            "validated" => Ok(TaskState::Validated),
            "archived" => Ok(TaskState::Archived),
            other => Err(Error::Validation(format!("unknown task state: {other}"))),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
