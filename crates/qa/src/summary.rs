// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle summaries: the authoritative promotion evidence.
//!
//! One `bundle.json` is written at the bundle root's round directory;
//! every checker resolves a member to its root and reads that summary.
//! Summaries are never mirrored into member directories.

use crate::report::{ValidationStatus, ValidatorReport};
use crate::scope::ResolvedScope;
use edison_core::error::{Error, Result};
use edison_storage::{atomic, Layout};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-validator verdict recorded in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorStatusEntry {
    pub id: String,
    pub status: ValidationStatus,
}

/// `bundle.json`: computed once per round after execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSummary {
    pub root_task: String,
    pub scope: ResolvedScope,
    /// The resolved preset, recorded so promotion guards consume the
    /// policy resolver's output rather than re-deriving it.
    pub preset: String,
    pub round: u32,
    pub approved: bool,
    /// Cluster members (including the root), id ascending.
    pub tasks: Vec<String>,
    pub validators: Vec<ValidatorStatusEntry>,
    /// Blocking validators without an approved report.
    pub missing: Vec<String>,
}

impl BundleSummary {
    /// Compute the summary from executed reports.
    ///
    /// `approved` holds iff every blocking validator has a report whose
    /// status is not REJECTED.
    pub fn compute(
        root_task: &str,
        scope: ResolvedScope,
        preset: &str,
        round: u32,
        tasks: Vec<String>,
        reports: &[ValidatorReport],
        blocking: &[String],
    ) -> Self {
        let validators: Vec<ValidatorStatusEntry> = reports
            .iter()
            .map(|r| ValidatorStatusEntry {
                id: r.validator.clone(),
                status: r.status,
            })
            .collect();
        let missing: Vec<String> = blocking
            .iter()
            .filter(|id| {
                !reports
                    .iter()
                    .any(|r| &r.validator == *id && !r.status.is_rejected())
            })
            .cloned()
            .collect();
        Self {
            root_task: root_task.to_string(),
            scope,
            preset: preset.to_string(),
            round,
            approved: missing.is_empty(),
            tasks,
            validators,
            missing,
        }
    }

    pub fn path(layout: &Layout, root_task: &str, round: u32) -> PathBuf {
        layout.round_dir(root_task, round).join("bundle.json")
    }

    /// Write to the root's round directory.
    pub fn write(&self, layout: &Layout) -> Result<PathBuf> {
        let path = Self::path(layout, &self.root_task, self.round);
        atomic::write_json(&path, self)?;
        Ok(path)
    }

    /// Load a specific round's summary, if the round completed.
    pub fn load(layout: &Layout, root_task: &str, round: u32) -> Result<Option<Self>> {
        let path = Self::path(layout, root_task, round);
        let Some(text) = atomic::read_text_optional(&path)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Validation(format!("corrupt bundle summary {}: {e}", path.display())))
    }

    /// Highest round directory present for a task (0 = none).
    pub fn latest_round(layout: &Layout, task: &str) -> Result<u32> {
        let dir = layout.evidence_task_dir(task);
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut latest = 0;
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                if let Some(n) = name.strip_prefix("round-").and_then(|s| s.parse::<u32>().ok()) {
                    latest = latest.max(n);
                }
            }
        }
        Ok(latest)
    }

    /// Resolve the latest summary governing a task: the task's
    /// `bundle_root` (or itself) at its highest completed round.
    pub fn load_latest_for(
        layout: &Layout,
        root_task: &str,
    ) -> Result<Option<Self>> {
        let mut round = Self::latest_round(layout, root_task)?;
        // Walk back past rounds that never completed (no bundle.json).
        while round > 0 {
            if let Some(summary) = Self::load(layout, root_task, round)? {
                return Ok(Some(summary));
            }
            round -= 1;
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
