// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity repository: uniform load/save/list/transition.
//!
//! A transition holds the entity's advisory lock across
//! read → guard evaluation → write → audit emit, making transitions
//! linearizable per entity. Any failure before the write leaves the file
//! untouched.

use crate::atomic;
use crate::entities;
use crate::frontmatter::Document;
use crate::jsonl::EventLog;
use crate::lock::FileLock;
use crate::paths::Layout;
use edison_core::actor::Actor;
use edison_core::clock::Clock;
use edison_core::error::{Error, Result};
use edison_core::event::{AuditEvent, EventKind};
use edison_core::machine::{Guard, GuardOutcome, StateMachine};
use edison_core::qa::QaRecord;
use edison_core::session::Session;
use edison_core::state::TaskState;
use edison_core::task::Task;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Capability interface implemented by every stored entity kind.
pub trait PersistedEntity: Clone {
    const KIND: &'static str;

    fn entity_id(&self) -> &str;
    fn state_str(&self) -> &'static str;
    fn touch_meta(&mut self, clock: &dyn Clock);
    fn to_document(&self) -> Result<Document>;
    fn from_document(doc: Document) -> Result<Self>;
}

impl PersistedEntity for Task {
    const KIND: &'static str = "task";

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    fn state_str(&self) -> &'static str {
        self.state.as_str()
    }

    fn touch_meta(&mut self, clock: &dyn Clock) {
        self.touch(clock);
    }

    fn to_document(&self) -> Result<Document> {
        entities::task_to_document(self)
    }

    fn from_document(doc: Document) -> Result<Self> {
        entities::task_from_document(doc)
    }
}

impl PersistedEntity for QaRecord {
    const KIND: &'static str = "qa";

    fn entity_id(&self) -> &str {
        &self.id
    }

    fn state_str(&self) -> &'static str {
        self.state.as_str()
    }

    fn touch_meta(&mut self, clock: &dyn Clock) {
        self.touch(clock);
    }

    fn to_document(&self) -> Result<Document> {
        entities::qa_to_document(self)
    }

    fn from_document(doc: Document) -> Result<Self> {
        entities::qa_from_document(doc)
    }
}

impl PersistedEntity for Session {
    const KIND: &'static str = "session";

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    fn state_str(&self) -> &'static str {
        self.state.as_str()
    }

    fn touch_meta(&mut self, clock: &dyn Clock) {
        self.touch(clock);
    }

    fn to_document(&self) -> Result<Document> {
        entities::session_to_document(self)
    }

    fn from_document(doc: Document) -> Result<Self> {
        entities::session_from_document(doc)
    }
}

/// Ambient inputs for a transition, threaded explicitly.
pub struct TransitionCtx<'a> {
    pub actor: Actor,
    pub reason: Option<String>,
    pub clock: &'a dyn Clock,
    /// The `transitions` audit stream.
    pub transitions: &'a EventLog,
}

/// A committed transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome<E> {
    pub entity: E,
    pub from: String,
    pub to: String,
    /// Authoritative location after the transition.
    pub path: PathBuf,
    pub event: AuditEvent,
}

/// Evaluate a rule's guards in declared order; the first denial
/// short-circuits as `TransitionBlocked`.
fn evaluate_guards<E>(
    machine: &StateMachine,
    from: &str,
    to: &str,
    entity: &E,
    guards: &[&dyn Guard<E>],
) -> Result<()> {
    let rule = machine.require(from, to)?;
    for guard_id in &rule.guards {
        let guard = guards
            .iter()
            .find(|g| g.id() == guard_id.as_str())
            .ok_or_else(|| Error::Config(format!("no guard registered for {guard_id}")))?;
        if let GuardOutcome::Deny { reason } = guard.check(entity) {
            return Err(Error::TransitionBlocked {
                guard: guard_id.clone(),
                reason,
            });
        }
    }
    Ok(())
}

fn write_entity<E: PersistedEntity>(path: &Path, entity: &E) -> Result<()> {
    let doc = entity.to_document()?;
    atomic::write_text(path, &doc.serialize()?)
}

fn read_entity<E: PersistedEntity>(path: &Path) -> Result<E> {
    let text = atomic::read_text(path)?;
    E::from_document(Document::parse(&text)?)
}

fn emit_transition(
    ctx: &TransitionCtx,
    subject: &str,
    from: &str,
    to: &str,
    path: &Path,
) -> Result<AuditEvent> {
    let mut payload = AuditEvent::transition_payload(from, to, ctx.reason.as_deref());
    if let (Some(obj), Some(path_str)) = (payload.as_object_mut(), path.to_str()) {
        obj.insert("path".to_string(), serde_json::Value::String(path_str.to_string()));
    }
    ctx.transitions.append(AuditEvent::new(
        ctx.clock.now(),
        EventKind::Transition,
        ctx.actor.clone(),
        subject,
        payload,
    ))
}

/// Repository for tasks. The file location encodes state and session
/// scope, so transitions may move the file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    layout: Layout,
}

impl TaskStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Authoritative path for a task's current attributes.
    pub fn path_of(&self, task: &Task) -> PathBuf {
        match &task.session {
            Some(session) => self.layout.session_task_file(session, task.id.as_str()),
            None => self.layout.task_file(task.state, task.id.as_str()),
        }
    }

    /// Locate a task's file across state directories and session scopes.
    pub fn find(&self, id: &str) -> Result<Option<(PathBuf, Task)>> {
        for state in TaskState::ALL {
            let path = self.layout.task_file(state, id);
            if path.is_file() {
                return Ok(Some((path.clone(), read_entity(&path)?)));
            }
        }
        for session in self.session_dirs()? {
            let path = self.layout.session_task_file(&session, id);
            if path.is_file() {
                return Ok(Some((path.clone(), read_entity(&path)?)));
            }
        }
        Ok(None)
    }

    pub fn load(&self, id: &str) -> Result<Task> {
        self.find(id)?
            .map(|(_, task)| task)
            .ok_or_else(|| Error::not_found("task", id))
    }

    /// Create a new task file; the id must be globally unique.
    pub fn create(&self, task: &Task) -> Result<PathBuf> {
        let _lock = FileLock::acquire(&self.layout.lock_file(Task::KIND, task.entity_id()))?;
        if self.find(task.entity_id())?.is_some() {
            return Err(Error::Validation(format!(
                "task id already exists: {}",
                task.entity_id()
            )));
        }
        let path = self.path_of(task);
        write_entity(&path, task)?;
        Ok(path)
    }

    /// Persist attribute changes without a state transition. Moves the
    /// file when session scope changed.
    pub fn save(&self, task: &Task) -> Result<PathBuf> {
        let _lock = FileLock::acquire(&self.layout.lock_file(Task::KIND, task.entity_id()))?;
        let previous = self.find(task.entity_id())?;
        let path = self.path_of(task);
        write_entity(&path, task)?;
        if let Some((old_path, _)) = previous {
            if old_path != path {
                atomic::remove_if_exists(&old_path)?;
            }
        }
        Ok(path)
    }

    /// All tasks, ordered by id ascending (ties broken by path).
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut found: Vec<(String, PathBuf, Task)> = Vec::new();
        for state in TaskState::ALL {
            let dir = self.layout.task_state_dir(state);
            for path in md_files(&dir)? {
                match read_entity::<Task>(&path) {
                    Ok(task) => found.push((task.id.to_string(), path, task)),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable task"),
                }
            }
        }
        for session in self.session_dirs()? {
            let dir = self.layout.session_dir(&session);
            for path in md_files(&dir)? {
                if path.file_name().and_then(|n| n.to_str()) == Some("session.md") {
                    continue;
                }
                match read_entity::<Task>(&path) {
                    Ok(task) => found.push((task.id.to_string(), path, task)),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable task"),
                }
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(found.into_iter().map(|(_, _, task)| task).collect())
    }

    /// Tasks claimed into the given session.
    pub fn list_session(&self, session: &str) -> Result<Vec<Task>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| t.session.as_deref() == Some(session))
            .collect())
    }

    /// Guarded state transition; `mutate` applies attribute changes after
    /// the guards pass (e.g. setting the claim's session scope).
    pub fn transition(
        &self,
        id: &str,
        to: TaskState,
        guards: &[&dyn Guard<Task>],
        ctx: &TransitionCtx,
        mutate: impl FnOnce(&mut Task),
    ) -> Result<TransitionOutcome<Task>> {
        let machine = edison_core::machine::task_machine();
        let _lock = FileLock::acquire(&self.layout.lock_file(Task::KIND, id))?;
        let (old_path, mut task) = self
            .find(id)?
            .ok_or_else(|| Error::not_found("task", id))?;
        let from = task.state;
        evaluate_guards(&machine, from.as_str(), to.as_str(), &task, guards)?;

        task.state = to;
        task.touch_meta(ctx.clock);
        mutate(&mut task);

        let new_path = self.path_of(&task);
        write_entity(&new_path, &task)?;
        if new_path != old_path {
            atomic::remove_if_exists(&old_path)?;
        }
        let event = emit_transition(ctx, id, from.as_str(), to.as_str(), &new_path)?;
        debug!(task = id, from = %from, to = %to, "task transition committed");
        Ok(TransitionOutcome {
            entity: task,
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            path: new_path,
            event,
        })
    }

    /// Apply a change to two tasks as one logical operation.
    ///
    /// Locks are taken in sorted-id order to prevent deadlock; both files
    /// are rewritten, and if the second write fails the first is rolled
    /// back best-effort and `IntegrityError` is returned.
    pub fn update_pair(
        &self,
        a: &str,
        b: &str,
        apply: impl FnOnce(&mut Task, &mut Task) -> Result<()>,
    ) -> Result<()> {
        if a == b {
            return Err(Error::Validation(format!(
                "task {a} may not reference itself"
            )));
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let _lock_first = FileLock::acquire(&self.layout.lock_file(Task::KIND, first))?;
        let _lock_second = FileLock::acquire(&self.layout.lock_file(Task::KIND, second))?;

        let (path_a, mut task_a) = self.find(a)?.ok_or_else(|| Error::not_found("task", a))?;
        let (path_b, mut task_b) = self.find(b)?.ok_or_else(|| Error::not_found("task", b))?;
        let before_a = atomic::read_text(&path_a)?;

        apply(&mut task_a, &mut task_b)?;

        write_entity(&path_a, &task_a)?;
        if let Err(e) = write_entity(&path_b, &task_b) {
            if let Err(rollback) = atomic::write_text(&path_a, &before_a) {
                warn!(path = %path_a.display(), error = %rollback,
                    "rollback of first task write failed");
            }
            return Err(Error::Integrity(format!(
                "could not update {b} after writing {a}: {e}"
            )));
        }
        Ok(())
    }

    fn session_dirs(&self) -> Result<Vec<String>> {
        let dir = self.layout.sessions_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut sessions = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    sessions.push(name.to_string());
                }
            }
        }
        sessions.sort();
        Ok(sessions)
    }
}

/// Repository for QA records (single directory; no file moves).
#[derive(Debug, Clone)]
pub struct QaStore {
    layout: Layout,
}

impl QaStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn load(&self, qa_id: &str) -> Result<QaRecord> {
        let path = self.layout.qa_file(qa_id);
        if !path.is_file() {
            return Err(Error::not_found("qa record", qa_id));
        }
        read_entity(&path)
    }

    /// Load the record for a task, creating a pending one if absent.
    pub fn load_or_create(&self, task_id: &str, clock: &dyn Clock) -> Result<QaRecord> {
        let qa_id = format!("{task_id}-qa");
        match self.load(&qa_id) {
            Ok(record) => Ok(record),
            Err(Error::NotFound { .. }) => {
                let record = QaRecord::new(task_id.into(), clock);
                self.save(&record)?;
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, record: &QaRecord) -> Result<PathBuf> {
        let _lock = FileLock::acquire(&self.layout.lock_file(QaRecord::KIND, record.entity_id()))?;
        let path = self.layout.qa_file(record.entity_id());
        write_entity(&path, record)?;
        Ok(path)
    }

    pub fn list(&self) -> Result<Vec<QaRecord>> {
        let mut records = Vec::new();
        for path in md_files(&self.layout.qa_records_dir())? {
            match read_entity::<QaRecord>(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable qa record"),
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    pub fn transition(
        &self,
        qa_id: &str,
        to: edison_core::qa::QaState,
        guards: &[&dyn Guard<QaRecord>],
        ctx: &TransitionCtx,
    ) -> Result<TransitionOutcome<QaRecord>> {
        let machine = edison_core::machine::qa_machine();
        let _lock = FileLock::acquire(&self.layout.lock_file(QaRecord::KIND, qa_id))?;
        let path = self.layout.qa_file(qa_id);
        if !path.is_file() {
            return Err(Error::not_found("qa record", qa_id));
        }
        let mut record: QaRecord = read_entity(&path)?;
        let from = record.state;
        evaluate_guards(&machine, from.as_str(), to.as_str(), &record, guards)?;
        record.state = to;
        record.touch_meta(ctx.clock);
        write_entity(&path, &record)?;
        let event = emit_transition(ctx, qa_id, from.as_str(), to.as_str(), &path)?;
        Ok(TransitionOutcome {
            entity: record,
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            path,
            event,
        })
    }
}

/// Repository for session records.
#[derive(Debug, Clone)]
pub struct SessionStore {
    layout: Layout,
}

impl SessionStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.layout.session_record(id).is_file()
    }

    pub fn load(&self, id: &str) -> Result<Session> {
        let path = self.layout.session_record(id);
        if !path.is_file() {
            return Err(Error::not_found("session", id));
        }
        read_entity(&path)
    }

    pub fn save(&self, session: &Session) -> Result<PathBuf> {
        let _lock = FileLock::acquire(&self.layout.lock_file(Session::KIND, session.entity_id()))?;
        let path = self.layout.session_record(session.entity_id());
        write_entity(&path, session)?;
        Ok(path)
    }

    pub fn list(&self) -> Result<Vec<Session>> {
        let dir = self.layout.sessions_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut sessions = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            let record = entry.path().join("session.md");
            if record.is_file() {
                match read_entity::<Session>(&record) {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        warn!(path = %record.display(), error = %e, "skipping unreadable session")
                    }
                }
            }
        }
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sessions)
    }

    pub fn transition(
        &self,
        id: &str,
        to: edison_core::session::SessionState,
        ctx: &TransitionCtx,
    ) -> Result<TransitionOutcome<Session>> {
        let machine = edison_core::machine::session_machine();
        let _lock = FileLock::acquire(&self.layout.lock_file(Session::KIND, id))?;
        let path = self.layout.session_record(id);
        if !path.is_file() {
            return Err(Error::not_found("session", id));
        }
        let mut session: Session = read_entity(&path)?;
        let from = session.state;
        let no_guards: [&dyn Guard<Session>; 0] = [];
        evaluate_guards(&machine, from.as_str(), to.as_str(), &session, &no_guards)?;
        session.state = to;
        session.touch_meta(ctx.clock);
        write_entity(&path, &session)?;
        let event = emit_transition(ctx, id, from.as_str(), to.as_str(), &path)?;
        Ok(TransitionOutcome {
            entity: session,
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            path,
            event,
        })
    }
}

fn md_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
