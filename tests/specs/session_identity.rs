//! Session-id inference boundary cases.

use crate::prelude::Repo;
use edison_core::session::SessionState;
use edison_session::{FakeInspector, Resolution, ResolutionSource, SessionResolver};

fn claude_tree() -> FakeInspector {
    FakeInspector::new(300)
        .with_process(12345, "claude", &["claude"], None)
        .with_process(200, "zsh", &["zsh"], Some(12345))
        .with_process(300, "edison", &["edison", "session", "next"], Some(200))
}

#[test]
fn session_id_file_in_primary_checkout_is_ignored() {
    let repo = Repo::new();
    repo.add_session("claude-pid-12345");
    repo.add_session("other-pid-1");
    std::fs::write(repo.layout.session_id_file(), "other-pid-1\n").unwrap();

    let inspector = claude_tree();
    let resolver = SessionResolver::new(&repo.layout, &repo.sessions, &inspector);
    let resolution = resolver.resolve(None, None).unwrap();
    // Derivation wins: the marker file only applies in linked worktrees.
    assert_eq!(
        resolution,
        Resolution::Resolved {
            id: "claude-pid-12345".to_string(),
            source: ResolutionSource::ProcessTree,
        }
    );
}

#[test]
fn seq_disambiguation_prefers_active_then_most_recent() {
    let repo = Repo::new();
    repo.add_session("claude-pid-12345");
    repo.clock.advance_secs(5);
    repo.add_session("claude-pid-12345"); // allocated as -seq-1

    // Close the bare-prefix session; the seq sibling stays active.
    let mut base = repo.sessions.load("claude-pid-12345").unwrap();
    base.state = SessionState::Closed;
    repo.sessions.save(&base).unwrap();

    let inspector = claude_tree();
    let resolver = SessionResolver::new(&repo.layout, &repo.sessions, &inspector);
    let resolution = resolver.resolve(None, None).unwrap();
    assert_eq!(resolution.id(), Some("claude-pid-12345-seq-1"));

    // With both closed, the most recently active wins.
    let mut seq = repo.sessions.load("claude-pid-12345-seq-1").unwrap();
    seq.state = SessionState::Closed;
    repo.sessions.save(&seq).unwrap();
    let resolution = resolver.resolve(None, None).unwrap();
    assert_eq!(resolution.id(), Some("claude-pid-12345-seq-1"));
}

#[test]
fn resolution_is_idempotent_once_resolved() {
    let repo = Repo::new();
    repo.add_session("claude-pid-12345");
    let inspector = claude_tree();
    let resolver = SessionResolver::new(&repo.layout, &repo.sessions, &inspector);

    let first = resolver.resolve(None, None).unwrap();
    let id = first.id().unwrap().to_string();
    let second = resolver.resolve(Some(&id), None).unwrap();
    assert_eq!(second.id(), Some(id.as_str()));
}
