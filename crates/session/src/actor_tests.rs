// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::process::FakeInspector;
use edison_core::actor::ActorKind;
use edison_core::clock::{Clock, FakeClock};
use edison_core::event::{AuditEvent, EventKind};

struct Fixture {
    _dir: tempfile::TempDir,
    layout: Layout,
    store: SessionStore,
    events: EventLog,
    clock: FakeClock,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
        let layout = Layout::discover(dir.path()).unwrap();
        let store = SessionStore::new(layout.clone());
        let events = EventLog::new(layout.stream_file(EventKind::ProcessEvent));
        Self {
            _dir: dir,
            layout,
            store,
            events,
            clock: FakeClock::at(1_700_000_000_000),
        }
    }

    fn record_process(&self, pid: u32, actor_kind: &str) {
        self.events
            .append(AuditEvent::new(
                self.clock.now(),
                EventKind::ProcessEvent,
                Actor::unknown(),
                format!("pid-{pid}"),
                serde_json::json!({"pid": pid, "actor_kind": actor_kind}),
            ))
            .unwrap();
    }
}

fn inspector() -> FakeInspector {
    FakeInspector::new(300)
        .with_process(100, "claude", &["claude"], None)
        .with_process(300, "edison", &["edison"], Some(100))
}

#[test]
fn env_kind_wins() {
    let fx = Fixture::new();
    let inspector = inspector();
    let actor = resolve_actor(
        &fx.layout,
        &fx.store,
        &inspector,
        &fx.events,
        Some("validator"),
        Some("global-codex"),
    );
    assert_eq!(actor.kind, ActorKind::Validator);
    assert_eq!(actor.id.as_deref(), Some("global-codex"));
}

#[test]
fn unknown_env_kind_fails_open() {
    let fx = Fixture::new();
    let inspector = inspector();
    let actor = resolve_actor(&fx.layout, &fx.store, &inspector, &fx.events, Some("robot"), None);
    assert_eq!(actor.kind, ActorKind::Unknown);
}

#[test]
fn tail_scan_matches_topmost_pid() {
    let fx = Fixture::new();
    fx.record_process(999, "validator");
    fx.record_process(100, "orchestrator");
    let inspector = inspector();

    let actor = resolve_actor(&fx.layout, &fx.store, &inspector, &fx.events, None, None);
    assert_eq!(actor.kind, ActorKind::Orchestrator);
}

#[test]
fn no_match_fails_open_to_unknown() {
    let fx = Fixture::new();
    fx.record_process(999, "agent");
    let inspector = inspector();

    let actor = resolve_actor(&fx.layout, &fx.store, &inspector, &fx.events, None, None);
    assert_eq!(actor.kind, ActorKind::Unknown);
}

#[test]
fn unavailable_inspector_fails_open() {
    let fx = Fixture::new();
    let inspector = FakeInspector::unavailable();
    let actor = resolve_actor(&fx.layout, &fx.store, &inspector, &fx.events, None, None);
    assert_eq!(actor, Actor::unknown());
}
