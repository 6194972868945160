//! Claiming prints the authoritative location and audits the move.

use crate::prelude::Repo;
use edison_core::event::EventKind;
use edison_core::state::TaskState;
use edison_engine::claim_task;
use edison_storage::EventLog;

#[test]
fn claim_moves_file_and_returns_authoritative_location() {
    let repo = Repo::new();
    repo.add_session("S1");
    repo.add_task("T1");

    let outcome = claim_task(&repo.engine(), "S1", "T1").unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["id"], "T1");
    assert_eq!(json["state"], "wip");
    assert_eq!(json["session"], "S1");
    assert_eq!(json["path"], ".project/sessions/S1/T1.md");

    // The file is where the payload says it is, and only there.
    assert!(repo.layout.session_task_file("S1", "T1").is_file());
    assert!(!repo.layout.task_file(TaskState::Todo, "T1").exists());

    // Exactly one transition event for the claim.
    let log = EventLog::new(repo.layout.stream_file(EventKind::Transition));
    let events: Vec<_> = log
        .read_all()
        .unwrap()
        .into_iter()
        .filter(|e| e.subject == "T1")
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["from"], "todo");
    assert_eq!(events[0].payload["to"], "wip");
}

#[test]
fn claimed_task_state_matches_its_location() {
    let repo = Repo::new();
    repo.add_session("S1");
    repo.add_task("T1");
    claim_task(&repo.engine(), "S1", "T1").unwrap();

    let task = repo.tasks.load("T1").unwrap();
    assert_eq!(task.state, TaskState::Wip);
    assert!(task.claimed_at.is_some());
    assert_eq!(task.session.as_deref(), Some("S1"));
}
