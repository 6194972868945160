//! Staleness warns; it never blocks claims or continuation.

use crate::prelude::Repo;
use edison_core::event::EventKind;
use edison_core::state::TaskState;
use edison_engine::{claim_task, session_next};
use edison_storage::EventLog;

#[test]
fn stale_session_still_claims_and_continues() {
    let repo = Repo::new();
    repo.add_session("S2");
    repo.add_task("T2");

    // Push the session past the inactivity threshold.
    repo.clock
        .advance_secs(repo.config.session.recovery.stale_after_seconds + 60);
    assert_eq!(repo.manager().stale_sessions().unwrap().len(), 1);

    // The claim succeeds and the warning lands in the activity log.
    let outcome = claim_task(&repo.engine(), "S2", "T2").unwrap();
    assert_eq!(outcome.state, TaskState::Wip);

    let activity = EventLog::new(repo.layout.stream_file(EventKind::SessionActivity));
    let warnings = activity.read_all().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].payload["warning"]
        .as_str()
        .unwrap()
        .contains("stale"));
}

#[test]
fn session_next_reports_incomplete_with_a_pointer() {
    let mut repo = Repo::new();
    repo.config.continuation.default_mode = edison_core::ContinuationMode::Soft;
    repo.add_session("S2");
    repo.add_task("T2");
    claim_task(&repo.engine(), "S2", "T2").unwrap();
    repo.clock
        .advance_secs(repo.config.session.recovery.stale_after_seconds + 60);

    let payload = session_next(&repo.engine(), "S2");
    assert!(!payload.completion.is_complete);
    assert!(payload.blockers.is_empty());
    assert!(payload.continuation.should_continue);
    let prompt = payload.continuation.prompt.unwrap();
    assert!(prompt.contains("edison task done T2"));
}
