// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use crate::ctx::EngineCtx;
use edison_core::actor::{Actor, ActorKind};
use edison_core::clock::FakeClock;
use edison_core::config::EdisonConfig;
use edison_core::id::SequentialIdGen;
use edison_core::session::Session;
use edison_core::task::Task;
use edison_storage::{Layout, QaStore, SessionStore, TaskStore};

pub(crate) struct Fixture {
    pub _dir: tempfile::TempDir,
    pub layout: Layout,
    pub config: EdisonConfig,
    pub tasks: TaskStore,
    pub qa: QaStore,
    pub sessions: SessionStore,
    pub clock: FakeClock,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
        let layout = Layout::discover(dir.path()).unwrap();
        Self {
            tasks: TaskStore::new(layout.clone()),
            qa: QaStore::new(layout.clone()),
            sessions: SessionStore::new(layout.clone()),
            layout,
            _dir: dir,
            config: EdisonConfig::default(),
            clock: FakeClock::at(1_700_000_000_000),
        }
    }

    pub fn ctx(&self) -> EngineCtx<'_, SequentialIdGen> {
        EngineCtx {
            layout: &self.layout,
            config: &self.config,
            tasks: &self.tasks,
            qa: &self.qa,
            sessions: &self.sessions,
            clock: &self.clock,
            actor: Actor::new(ActorKind::Orchestrator, None),
            id_gen: SequentialIdGen::new("cont"),
        }
    }

    pub fn add_session(&self, id: &str) {
        self.sessions.save(&Session::new(id, &self.clock)).unwrap();
    }

    pub fn add_task(&self, id: &str) {
        self.tasks
            .create(&Task::new(id, format!("task {id}"), &self.clock))
            .unwrap();
    }
}
