// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::actor::ActorKind;
use edison_core::clock::FakeClock;
use edison_core::task::Task;

struct Fixture {
    _dir: tempfile::TempDir,
    layout: Layout,
    store: SessionStore,
    tasks: TaskStore,
    config: EdisonConfig,
    clock: FakeClock,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
        let layout = Layout::discover(dir.path()).unwrap();
        Self {
            _dir: dir,
            store: SessionStore::new(layout.clone()),
            tasks: TaskStore::new(layout.clone()),
            layout,
            config: EdisonConfig::default(),
            clock: FakeClock::at(1_700_000_000_000),
        }
    }

    fn manager(&self) -> SessionManager<'_> {
        SessionManager::new(&self.layout, &self.store, &self.tasks, &self.config, &self.clock)
    }

    fn actor(&self) -> Actor {
        Actor::new(ActorKind::Orchestrator, None)
    }
}

#[test]
fn create_uses_bare_prefix_first() {
    let fx = Fixture::new();
    let session = fx
        .manager()
        .create("claude-pid-42", Some("claude".into()), Some(42), &fx.actor())
        .unwrap();
    assert_eq!(session.id, "claude-pid-42");
    assert_eq!(session.state, SessionState::Active);
    assert!(fx.store.exists("claude-pid-42"));
}

#[test]
fn second_create_allocates_seq_suffix() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager
        .create("claude-pid-42", None, Some(42), &fx.actor())
        .unwrap();
    let second = manager
        .create("claude-pid-42", None, Some(42), &fx.actor())
        .unwrap();
    assert_eq!(second.id, "claude-pid-42-seq-1");

    let third = manager
        .create("claude-pid-42", None, Some(42), &fx.actor())
        .unwrap();
    assert_eq!(third.id, "claude-pid-42-seq-2");
}

#[test]
fn create_records_a_process_event() {
    let fx = Fixture::new();
    fx.manager()
        .create("claude-pid-42", None, Some(42), &fx.actor())
        .unwrap();
    let log = EventLog::new(fx.layout.stream_file(EventKind::ProcessEvent));
    let events = log.read_all().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["pid"], 42);
    assert_eq!(events[0].payload["actor_kind"], "orchestrator");
}

#[test]
fn session_id_file_only_written_in_worktrees() {
    let fx = Fixture::new();
    fx.manager()
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();
    assert!(!fx.layout.session_id_file().exists());

    std::fs::write(fx.layout.root().join(".git"), "gitdir: /elsewhere\n").unwrap();
    fx.manager()
        .create("codex-pid-7", None, None, &fx.actor())
        .unwrap();
    let content = std::fs::read_to_string(fx.layout.session_id_file()).unwrap();
    assert_eq!(content.trim(), "codex-pid-7");
}

#[test]
fn touch_refreshes_last_active() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let created = manager
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();
    fx.clock.advance_secs(100);
    let touched = manager.touch("claude-pid-42").unwrap();
    assert!(touched.last_active > created.last_active);
}

#[test]
fn stale_sessions_respect_threshold() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();
    assert!(manager.stale_sessions().unwrap().is_empty());

    fx.clock.advance_secs(fx.config.session.recovery.stale_after_seconds + 1);
    let stale = manager.stale_sessions().unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, "claude-pid-42");
}

#[test]
fn cleanup_restores_wip_claims_to_todo() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();

    // A task claimed into the session, in wip.
    let mut task = Task::new("T1", "claimed work", &fx.clock);
    task.state = TaskState::Wip;
    task.claim("claude-pid-42", "c1".to_string(), &fx.clock);
    fx.tasks.create(&task).unwrap();

    let report = manager.cleanup_stale("claude-pid-42", &fx.actor()).unwrap();
    assert_eq!(report.restored, vec!["T1"]);
    assert_eq!(report.state, SessionState::Archived);

    let restored = fx.tasks.load("T1").unwrap();
    assert_eq!(restored.state, TaskState::Todo);
    assert!(restored.session.is_none());
    assert!(restored.claimed_at.is_none());
    assert!(fx
        .layout
        .task_file(TaskState::Todo, "T1")
        .is_file());
}

#[test]
fn cleanup_releases_done_tasks_in_place() {
    let fx = Fixture::new();
    let manager = fx.manager();
    manager
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();

    let mut task = Task::new("T2", "finished work", &fx.clock);
    task.state = TaskState::Done;
    task.claim("claude-pid-42", "c2".to_string(), &fx.clock);
    fx.tasks.create(&task).unwrap();

    manager.cleanup_stale("claude-pid-42", &fx.actor()).unwrap();
    let restored = fx.tasks.load("T2").unwrap();
    assert_eq!(restored.state, TaskState::Done);
    assert!(restored.session.is_none());
    assert!(fx.layout.task_file(TaskState::Done, "T2").is_file());
}

#[test]
fn resume_touches_and_reports_missing_sessions() {
    let fx = Fixture::new();
    let manager = fx.manager();
    let err = manager.resume("ghost").unwrap_err();
    assert_eq!(err.code(), "not_found");

    manager
        .create("claude-pid-42", None, None, &fx.actor())
        .unwrap();
    assert!(manager.resume("claude-pid-42").is_ok());
}
