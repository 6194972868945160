//! Shared fixtures for the behavioral specs.

use edison_core::actor::{Actor, ActorKind};
use edison_core::clock::FakeClock;
use edison_core::config::EdisonConfig;
use edison_core::id::SequentialIdGen;
use edison_core::task::Task;
use edison_engine::EngineCtx;
use edison_session::SessionManager;
use edison_storage::{Layout, QaStore, SessionStore, TaskStore};

pub struct Repo {
    pub _dir: tempfile::TempDir,
    pub layout: Layout,
    pub config: EdisonConfig,
    pub tasks: TaskStore,
    pub qa: QaStore,
    pub sessions: SessionStore,
    pub clock: FakeClock,
}

impl Repo {
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
            clock: FakeClock::at(1_750_000_000_000),
        }
    }

    /// Config with one blocking validator (`global-codex`) required by
    /// both default presets.
    pub fn with_global_codex(mut self) -> Self {
        self.config
            .validation
            .validators
            .insert("global-codex".to_string(), Default::default());
        for preset in self.config.validation.presets.values_mut() {
            preset.validators = vec!["global-codex".to_string()];
        }
        self
    }

    pub fn engine(&self) -> EngineCtx<'_, SequentialIdGen> {
        EngineCtx {
            layout: &self.layout,
            config: &self.config,
            tasks: &self.tasks,
            qa: &self.qa,
            sessions: &self.sessions,
            clock: &self.clock,
            actor: self.actor(),
            id_gen: SequentialIdGen::new("cont"),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(ActorKind::Orchestrator, None)
    }

    pub fn manager(&self) -> SessionManager<'_> {
        SessionManager::new(
            &self.layout,
            &self.sessions,
            &self.tasks,
            &self.config,
            &self.clock,
        )
    }

    pub fn add_session(&self, id: &str) {
        self.manager()
            .create(id, Some("claude".to_string()), None, &self.actor())
            .unwrap();
    }

    pub fn add_task(&self, id: &str) -> Task {
        let task = Task::new(id, format!("task {id}"), &self.clock);
        self.tasks.create(&task).unwrap();
        task
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.layout.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}
