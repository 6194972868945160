// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation rounds: plan, execute, record evidence.
//!
//! A plan is side-effect free (the `--dry-run` surface). Execution
//! allocates the next round directory under the cluster root, runs the
//! union roster once, writes per-validator evidence and the bundle
//! summary, and keeps the QA record current.

use crate::executor::{ValidatorExecutor, ValidatorRequest};
use crate::policy::{ResolvedPolicy, ValidationPolicyResolver};
use crate::roster::{blocking_set, union_roster};
use crate::scope::{build_cluster, BundleScope, Cluster};
use crate::summary::BundleSummary;
use edison_core::actor::Actor;
use edison_core::cancel::CancelToken;
use edison_core::clock::Clock;
use edison_core::config::EdisonConfig;
use edison_core::error::Result;
use edison_core::event::{AuditEvent, EventKind};
use edison_core::qa::QaState;
use edison_graph::TaskGraph;
use edison_storage::{atomic, EventLog, Layout, QaStore, TaskStore, TransitionCtx};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// A resolved, not-yet-executed validation round.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationPlan {
    #[serde(skip)]
    pub cluster: Cluster,
    pub root: String,
    pub scope: String,
    pub tasks: Vec<String>,
    pub policy: ResolvedPolicy,
    pub roster: Vec<String>,
    pub blocking: Vec<String>,
    pub round: u32,
    pub round_dir: PathBuf,
}

/// Round orchestration over the stores.
pub struct ValidationRunner<'a> {
    layout: &'a Layout,
    tasks: &'a TaskStore,
    qa: &'a QaStore,
    config: &'a EdisonConfig,
    clock: &'a dyn Clock,
}

impl<'a> ValidationRunner<'a> {
    pub fn new(
        layout: &'a Layout,
        tasks: &'a TaskStore,
        qa: &'a QaStore,
        config: &'a EdisonConfig,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            layout,
            tasks,
            qa,
            config,
            clock,
        }
    }

    /// Resolve cluster, policy, and roster without touching disk.
    pub fn plan(
        &self,
        task_id: &str,
        scope: BundleScope,
        changed_files: &[String],
        override_preset: Option<&str>,
    ) -> Result<ValidationPlan> {
        let graph = TaskGraph::load(self.tasks)?;
        let cluster = build_cluster(&graph, task_id, scope)?;
        let resolver = ValidationPolicyResolver::new(&self.config.validation);
        let policy = resolver.resolve(changed_files, override_preset)?;
        let roster = union_roster(&self.config.validation, &policy, changed_files)?;
        let blocking = blocking_set(&self.config.validation, &roster);
        // Rounds are contiguous: N+1 exists only after N.
        let round = BundleSummary::latest_round(self.layout, &cluster.root)? + 1;
        let round_dir = self.layout.round_dir(&cluster.root, round);
        Ok(ValidationPlan {
            root: cluster.root.clone(),
            scope: cluster.scope.to_string(),
            tasks: cluster.members.clone(),
            cluster,
            policy,
            roster,
            blocking,
            round,
            round_dir,
        })
    }

    /// Execute a plan: run every validator once at the root evidence
    /// directory and write the authoritative bundle summary.
    pub fn execute(
        &self,
        plan: &ValidationPlan,
        executor: &dyn ValidatorExecutor,
        cancel: &CancelToken,
        actor: &Actor,
    ) -> Result<BundleSummary> {
        let transitions = EventLog::new(self.layout.stream_file(EventKind::Transition));
        let evidence = EventLog::new(self.layout.stream_file(EventKind::Evidence));
        let ctx = TransitionCtx {
            actor: actor.clone(),
            reason: Some(format!("validation round {}", plan.round)),
            clock: self.clock,
            transitions: &transitions,
        };

        let mut record = self.qa.load_or_create(&plan.cluster.root, self.clock)?;
        if record.state != QaState::Wip {
            record = self
                .qa
                .transition(&record.id.clone(), QaState::Wip, &[], &ctx)?
                .entity;
        }
        record.round = plan.round;
        self.qa.save(&record)?;

        std::fs::create_dir_all(&plan.round_dir)
            .map_err(|e| edison_core::Error::io(&plan.round_dir, e))?;

        let mut reports = Vec::with_capacity(plan.roster.len());
        for validator in &plan.roster {
            cancel.check()?;
            let request = ValidatorRequest {
                validator: validator.clone(),
                config: self
                    .config
                    .validation
                    .validators
                    .get(validator)
                    .cloned()
                    .unwrap_or_default(),
                root_task: plan.cluster.root.clone(),
                round: plan.round,
                round_dir: plan.round_dir.clone(),
                files: plan.cluster.members.clone(),
            };
            let report = executor.execute(&request, cancel)?;

            let json_path = plan.round_dir.join(format!("{validator}.json"));
            atomic::write_json(&json_path, &report)?;
            let md_path = plan.round_dir.join(format!("{validator}.md"));
            atomic::write_text(&md_path, &report.markdown_summary())?;

            evidence.append(AuditEvent::new(
                self.clock.now(),
                EventKind::Evidence,
                actor.clone(),
                plan.cluster.root.clone(),
                serde_json::json!({
                    "round": plan.round,
                    "validator": validator,
                    "status": report.status.to_string(),
                }),
            ))?;
            reports.push(report);
        }

        let summary = BundleSummary::compute(
            &plan.cluster.root,
            plan.cluster.scope,
            &plan.policy.preset,
            plan.round,
            plan.cluster.members.clone(),
            &reports,
            &plan.blocking,
        );
        summary.write(self.layout)?;
        evidence.append(AuditEvent::new(
            self.clock.now(),
            EventKind::Evidence,
            actor.clone(),
            plan.cluster.root.clone(),
            serde_json::json!({
                "round": plan.round,
                "file": "bundle.json",
                "approved": summary.approved,
            }),
        ))?;

        self.qa
            .transition(&format!("{}-qa", plan.cluster.root), QaState::Done, &[], &ctx)?;
        info!(
            root = %plan.cluster.root,
            round = plan.round,
            approved = summary.approved,
            "validation round complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
