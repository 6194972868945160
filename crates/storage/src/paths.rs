// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository layout: translating logical identities into filesystem paths.
//!
//! The repo root is the nearest ancestor containing `.edison/`. Resolution
//! fails closed: ambiguity or absence is an error, never a guess.

use edison_core::error::{Error, Result};
use edison_core::event::EventKind;
use edison_core::state::TaskState;
use std::path::{Path, PathBuf};

/// Resolved repository layout. Cheap to clone; holds only the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Walk ancestors of `start` for the nearest directory containing
    /// `.edison/`.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(".edison").is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            current = dir.parent();
        }
        Err(Error::Resolution(format!(
            "no .edison directory found above {}; cd into an Edison project or create .edison/",
            start.display()
        )))
    }

    /// Use an explicit root without discovery (tests, init).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Linked git worktrees have a `.git` *file* pointing at the real
    /// git dir; the primary checkout has a `.git` directory.
    pub fn is_linked_worktree(&self) -> bool {
        self.root.join(".git").is_file()
    }

    /// `.session-id` is honored only in linked worktrees; in the primary
    /// checkout it must be ignored.
    pub fn session_id_file(&self) -> PathBuf {
        self.root.join(".session-id")
    }

    // -- .edison --

    pub fn edison_dir(&self) -> PathBuf {
        self.root.join(".edison")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.edison_dir().join("config")
    }

    pub fn core_dir(&self) -> PathBuf {
        self.edison_dir().join("core")
    }

    pub fn overlays_dir(&self) -> PathBuf {
        self.edison_dir().join("overlays")
    }

    pub fn packs_dir(&self) -> PathBuf {
        self.edison_dir().join("packs")
    }

    pub fn pack_dir(&self, pack: &str) -> PathBuf {
        self.packs_dir().join(pack)
    }

    pub fn vendors_dir(&self) -> PathBuf {
        self.edison_dir().join("vendors")
    }

    pub fn vendor_worktree(&self, vendor: &str) -> PathBuf {
        self.vendors_dir().join(vendor).join("worktree")
    }

    /// Derived artifacts only; never canonical.
    pub fn generated_dir(&self) -> PathBuf {
        self.edison_dir().join("_generated")
    }

    // -- .project --

    pub fn project_dir(&self) -> PathBuf {
        self.root.join(".project")
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.project_dir().join("tasks")
    }

    pub fn task_state_dir(&self, state: TaskState) -> PathBuf {
        self.tasks_dir().join(state.dir_name())
    }

    /// Unclaimed task file: `.project/tasks/<state>/<id>.md`.
    pub fn task_file(&self, state: TaskState, id: &str) -> PathBuf {
        self.task_state_dir(state).join(format!("{id}.md"))
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.project_dir().join("sessions")
    }

    pub fn session_dir(&self, session: &str) -> PathBuf {
        self.sessions_dir().join(session)
    }

    /// The session record itself.
    pub fn session_record(&self, session: &str) -> PathBuf {
        self.session_dir(session).join("session.md")
    }

    /// Claimed task file: `.project/sessions/<session>/<id>.md`.
    pub fn session_task_file(&self, session: &str, id: &str) -> PathBuf {
        self.session_dir(session).join(format!("{id}.md"))
    }

    pub fn qa_dir(&self) -> PathBuf {
        self.project_dir().join("qa")
    }

    pub fn qa_records_dir(&self) -> PathBuf {
        self.qa_dir().join("records")
    }

    pub fn qa_file(&self, qa_id: &str) -> PathBuf {
        self.qa_records_dir().join(format!("{qa_id}.md"))
    }

    pub fn evidence_root(&self) -> PathBuf {
        self.qa_dir().join("validation-evidence")
    }

    pub fn evidence_task_dir(&self, task: &str) -> PathBuf {
        self.evidence_root().join(task)
    }

    /// `.project/qa/validation-evidence/<task>/round-<N>/`.
    pub fn round_dir(&self, task: &str, round: u32) -> PathBuf {
        self.evidence_task_dir(task).join(format!("round-{round}"))
    }

    pub fn events_dir(&self) -> PathBuf {
        self.project_dir().join("events")
    }

    pub fn stream_file(&self, kind: EventKind) -> PathBuf {
        self.events_dir().join(format!("{}.jsonl", kind.stream_name()))
    }

    /// Entity lock files live here so lock names survive the entity file
    /// moving between state directories.
    pub fn locks_dir(&self) -> PathBuf {
        self.project_dir().join(".locks")
    }

    pub fn lock_file(&self, kind: &str, id: &str) -> PathBuf {
        self.locks_dir().join(format!("{kind}-{id}.lock"))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
