// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side graph queries over an in-memory task index.
//!
//! Files hold only id strings; queries build an index keyed by id and
//! never serialize graph structure back.

use edison_core::error::Result;
use edison_core::state::TaskState;
use edison_core::task::Task;
use edison_storage::TaskStore;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Readiness of a task against its `depends_on` targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub ready: bool,
    /// Dependency ids not yet in a satisfying state (missing targets
    /// count as unmet, fail-closed).
    pub unmet: Vec<String>,
}

/// Immutable snapshot of all tasks, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: BTreeMap<String, Task>,
}

impl TaskGraph {
    pub fn load(store: &TaskStore) -> Result<Self> {
        Ok(Self::from_tasks(store.list()?))
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks
                .into_iter()
                .map(|t| (t.id.to_string(), t))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Transitive closure over child edges, excluding the root itself.
    /// Deterministic: id ascending.
    pub fn descendants(&self, root: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([root.to_string()]);
        while let Some(current) = queue.pop_front() {
            if let Some(task) = self.tasks.get(&current) {
                for child in task.children() {
                    if seen.insert(child.to_string()) {
                        queue.push_back(child.to_string());
                    }
                }
            }
        }
        seen.remove(root);
        seen.into_iter().collect()
    }

    /// Tasks whose `bundle_root` is `root`, id ascending.
    pub fn bundle_members(&self, root: &str) -> Vec<String> {
        self.tasks
            .values()
            .filter(|t| t.bundle_root() == Some(root))
            .map(|t| t.id.to_string())
            .collect()
    }

    /// Evaluate the readiness rule for one task.
    pub fn readiness(&self, task: &Task, satisfied: &[TaskState]) -> Readiness {
        let mut unmet = Vec::new();
        for dep in task.depends_on() {
            let ok = self
                .tasks
                .get(dep)
                .map(|t| satisfied.contains(&t.state))
                .unwrap_or(false);
            if !ok {
                unmet.push(dep.to_string());
            }
        }
        Readiness {
            ready: unmet.is_empty(),
            unmet,
        }
    }

    /// Planner waves: each wave holds todo tasks whose dependencies are
    /// satisfied by earlier waves or already-satisfied states. Within a
    /// wave, `related` tasks are kept adjacent.
    pub fn waves(&self, satisfied: &[TaskState]) -> Vec<Vec<String>> {
        let mut done: BTreeSet<String> = self
            .tasks
            .values()
            .filter(|t| satisfied.contains(&t.state))
            .map(|t| t.id.to_string())
            .collect();
        let mut pending: BTreeSet<String> = self
            .tasks
            .values()
            .filter(|t| t.state == TaskState::Todo)
            .map(|t| t.id.to_string())
            .collect();

        let mut waves = Vec::new();
        loop {
            let eligible: Vec<String> = pending
                .iter()
                .filter(|id| {
                    self.tasks
                        .get(*id)
                        .map(|t| t.depends_on().iter().all(|d| done.contains(*d)))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            if eligible.is_empty() {
                break;
            }
            let wave = self.cluster_related(eligible);
            for id in &wave {
                pending.remove(id);
                done.insert(id.clone());
            }
            waves.push(wave);
        }
        waves
    }

    /// Stable ordering that keeps `related` tasks adjacent: walk the
    /// id-sorted list, emitting each unplaced task followed by its
    /// related tasks from the same wave.
    fn cluster_related(&self, sorted: Vec<String>) -> Vec<String> {
        let wave_set: BTreeSet<&String> = sorted.iter().collect();
        let mut placed = BTreeSet::new();
        let mut out = Vec::with_capacity(sorted.len());
        for id in &sorted {
            if !placed.insert(id.clone()) {
                continue;
            }
            out.push(id.clone());
            if let Some(task) = self.tasks.get(id) {
                for related in task.related() {
                    let related = related.to_string();
                    if wave_set.contains(&related) && placed.insert(related.clone()) {
                        out.push(related);
                    }
                }
            }
        }
        out
    }
}

/// Todo tasks whose dependencies are all satisfied, id ascending.
pub fn ready_tasks<'a>(graph: &'a TaskGraph, satisfied: &[TaskState]) -> Vec<&'a Task> {
    graph
        .tasks()
        .filter(|t| t.state == TaskState::Todo)
        .filter(|t| graph.readiness(t, satisfied).ready)
        .collect()
}

#[cfg(test)]
#[path = "queries_tests.rs"]
mod tests;
