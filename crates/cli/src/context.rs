// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation application context.
//!
//! Built once per command from the working directory and environment;
//! everything downstream receives explicit references.

use anyhow::Result;
use edison_core::actor::Actor;
use edison_core::clock::SystemClock;
use edison_core::config::EdisonConfig;
use edison_core::event::EventKind;
use edison_core::id::UuidIdGen;
use edison_engine::EngineCtx;
use edison_session::{resolve_actor, SessionManager, SessionResolver, SysinfoInspector};
use edison_storage::{ConfigManager, EventLog, Layout, QaStore, SessionStore, TaskStore};

pub struct AppContext {
    pub layout: Layout,
    pub config_manager: ConfigManager,
    pub tasks: TaskStore,
    pub qa: QaStore,
    pub sessions: SessionStore,
    pub clock: SystemClock,
    pub inspector: SysinfoInspector,
    pub actor: Actor,
}

impl AppContext {
    /// Discover the repository from the current directory and load
    /// configuration and identity.
    pub fn init() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let layout = Layout::discover(&cwd)?;
        let config_manager = ConfigManager::load_with_env(&layout, std::env::vars())?;
        let tasks = TaskStore::new(layout.clone());
        let qa = QaStore::new(layout.clone());
        let sessions = SessionStore::new(layout.clone());
        let inspector = SysinfoInspector::new();

        let process_events = EventLog::new(layout.stream_file(EventKind::ProcessEvent));
        let actor = resolve_actor(
            &layout,
            &sessions,
            &inspector,
            &process_events,
            std::env::var("EDISON_ACTOR_KIND").ok().as_deref(),
            std::env::var("EDISON_ACTOR_ID").ok().as_deref(),
        );

        Ok(Self {
            layout,
            config_manager,
            tasks,
            qa,
            sessions,
            clock: SystemClock,
            inspector,
            actor,
        })
    }

    pub fn config(&self) -> &EdisonConfig {
        self.config_manager.typed()
    }

    pub fn engine(&self) -> EngineCtx<'_, UuidIdGen> {
        EngineCtx {
            layout: &self.layout,
            config: self.config(),
            tasks: &self.tasks,
            qa: &self.qa,
            sessions: &self.sessions,
            clock: &self.clock,
            actor: self.actor.clone(),
            id_gen: UuidIdGen,
        }
    }

    pub fn session_manager(&self) -> SessionManager<'_> {
        SessionManager::new(
            &self.layout,
            &self.sessions,
            &self.tasks,
            self.config(),
            &self.clock,
        )
    }

    pub fn resolver(&self) -> SessionResolver<'_> {
        SessionResolver::new(&self.layout, &self.sessions, &self.inspector)
    }

    /// Resolve the working session: explicit flag, then the resolver
    /// pipeline (AGENTS_SESSION, worktree file, process tree, owner).
    pub fn resolve_session(&self, explicit: Option<&str>) -> Result<String> {
        let env_session = std::env::var("AGENTS_SESSION").ok();
        let resolution = self
            .resolver()
            .resolve(explicit, env_session.as_deref())?;
        Ok(resolution.require()?)
    }
}
