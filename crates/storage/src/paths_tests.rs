// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::event::EventKind;

fn scratch_repo() -> (tempfile::TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
    let layout = Layout::discover(dir.path()).unwrap();
    (dir, layout)
}

#[test]
fn discover_finds_nearest_ancestor() {
    let (dir, layout) = scratch_repo();
    assert_eq!(layout.root(), dir.path());

    let nested = dir.path().join("src/deeply/nested");
    std::fs::create_dir_all(&nested).unwrap();
    let from_nested = Layout::discover(&nested).unwrap();
    assert_eq!(from_nested.root(), dir.path());
}

#[test]
fn discover_fails_closed_outside_a_project() {
    let dir = tempfile::tempdir().unwrap();
    let err = Layout::discover(dir.path()).unwrap_err();
    assert_eq!(err.code(), "resolution_error");
    assert!(err.to_string().contains(".edison"));
}

#[test]
fn primary_checkout_is_not_a_linked_worktree() {
    let (dir, layout) = scratch_repo();
    assert!(!layout.is_linked_worktree());

    // .git as a directory: still the primary checkout
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();
    assert!(!layout.is_linked_worktree());
}

#[test]
fn git_file_marks_linked_worktree() {
    let (dir, layout) = scratch_repo();
    std::fs::write(dir.path().join(".git"), "gitdir: /elsewhere/.git/worktrees/wt\n").unwrap();
    assert!(layout.is_linked_worktree());
}

#[test]
fn task_paths_encode_state() {
    let layout = Layout::at("/repo");
    assert_eq!(
        layout.task_file(edison_core::TaskState::Todo, "T1"),
        std::path::Path::new("/repo/.project/tasks/todo/T1.md")
    );
    assert_eq!(
        layout.session_task_file("claude-pid-1", "T1"),
        std::path::Path::new("/repo/.project/sessions/claude-pid-1/T1.md")
    );
}

#[test]
fn evidence_and_stream_paths() {
    let layout = Layout::at("/repo");
    assert_eq!(
        layout.round_dir("T1", 2),
        std::path::Path::new("/repo/.project/qa/validation-evidence/T1/round-2")
    );
    assert_eq!(
        layout.stream_file(EventKind::ProcessEvent),
        std::path::Path::new("/repo/.project/events/process-events.jsonl")
    );
    assert_eq!(
        layout.lock_file("task", "T1"),
        std::path::Path::new("/repo/.project/.locks/task-T1.lock")
    );
}
