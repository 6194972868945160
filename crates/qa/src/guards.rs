// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion guards for `done -> validated`.
//!
//! Fail-closed: a missing or unreadable artifact denies promotion with a
//! message naming the expected path and the exact remediation command.

use crate::summary::BundleSummary;
use edison_core::config::ValidationConfig;
use edison_core::machine::{guards, Guard, GuardOutcome};
use edison_core::task::Task;
use edison_storage::{atomic, Layout};

/// The evidence file that must exist (and be non-empty) in every round.
const IMPLEMENTATION_REPORT: &str = "implementation-report.md";

/// The preset under which absent automation evidence is tolerated.
const QUICK_PRESET: &str = "quick";

fn bundle_root_of(task: &Task) -> &str {
    task.bundle_root().unwrap_or(task.id.as_str())
}

fn load_summary(layout: &Layout, task: &Task) -> Result<BundleSummary, GuardOutcome> {
    let root = bundle_root_of(task);
    match BundleSummary::load_latest_for(layout, root) {
        Ok(Some(summary)) => Ok(summary),
        Ok(None) => Err(GuardOutcome::deny(format!(
            "no completed validation round for {root} (expected {}); \
             run `edison qa validate {root} --execute`",
            BundleSummary::path(layout, root, 1).display()
        ))),
        Err(e) => Err(GuardOutcome::deny(format!(
            "could not read bundle summary for {root}: {e}; \
             re-run `edison qa validate {root} --execute`"
        ))),
    }
}

/// `hasBundleApproval`: the member's bundle summary is approved with
/// nothing missing.
pub struct HasBundleApproval<'a> {
    layout: &'a Layout,
}

impl<'a> HasBundleApproval<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }
}

impl Guard<Task> for HasBundleApproval<'_> {
    fn id(&self) -> &str {
        guards::HAS_BUNDLE_APPROVAL
    }

    fn check(&self, task: &Task) -> GuardOutcome {
        let summary = match load_summary(self.layout, task) {
            Ok(summary) => summary,
            Err(deny) => return deny,
        };
        if !summary.tasks.iter().any(|t| t == task.id.as_str()) {
            return GuardOutcome::deny(format!(
                "task {} is not part of the latest validation round for {}; \
                 re-run `edison qa validate {} --execute`",
                task.id,
                summary.root_task,
                summary.root_task
            ));
        }
        if !summary.approved || !summary.missing.is_empty() {
            return GuardOutcome::deny(format!(
                "bundle {} round {} is not approved (missing: {}); \
                 address the findings and re-run `edison qa validate {} --execute`",
                summary.root_task,
                summary.round,
                summary.missing.join(", "),
                summary.root_task
            ));
        }
        GuardOutcome::Allow
    }
}

/// `hasRequiredEvidence`: every evidence file required by the resolved
/// preset is present. Under `quick`, automation evidence may be absent
/// or empty, but the implementation report must exist and be non-empty.
pub struct HasRequiredEvidence<'a> {
    layout: &'a Layout,
    validation: &'a ValidationConfig,
}

impl<'a> HasRequiredEvidence<'a> {
    pub fn new(layout: &'a Layout, validation: &'a ValidationConfig) -> Self {
        Self { layout, validation }
    }
}

impl Guard<Task> for HasRequiredEvidence<'_> {
    fn id(&self) -> &str {
        guards::HAS_REQUIRED_EVIDENCE
    }

    fn check(&self, task: &Task) -> GuardOutcome {
        let summary = match load_summary(self.layout, task) {
            Ok(summary) => summary,
            Err(deny) => return deny,
        };
        let preset = match self.validation.preset(&summary.preset) {
            Ok(preset) => preset,
            Err(e) => return GuardOutcome::deny(e.to_string()),
        };
        let round_dir = self.layout.round_dir(&summary.root_task, summary.round);

        for file in &preset.required_evidence {
            let path = round_dir.join(file);
            let content = match atomic::read_text_optional(&path) {
                Ok(content) => content,
                Err(e) => return GuardOutcome::deny(format!("unreadable evidence {}: {e}", path.display())),
            };
            let is_report = file == IMPLEMENTATION_REPORT;
            match content {
                None if summary.preset == QUICK_PRESET && !is_report => {
                    // Automation evidence may be absent under quick.
                }
                None => {
                    return GuardOutcome::deny(format!(
                        "required evidence missing: {}; write it and re-run \
                         `edison qa promote {}`",
                        path.display(),
                        task.id
                    ));
                }
                Some(content) if is_report && content.trim().is_empty() => {
                    return GuardOutcome::deny(format!(
                        "implementation report is empty: {}; describe the change, \
                         then re-run `edison qa promote {}`",
                        path.display(),
                        task.id
                    ));
                }
                Some(_) => {}
            }
        }
        GuardOutcome::Allow
    }
}

/// `hasAllWavesPassed`: every configured validation wave recorded an
/// approved status in the latest summary.
pub struct HasAllWavesPassed<'a> {
    layout: &'a Layout,
    validation: &'a ValidationConfig,
}

impl<'a> HasAllWavesPassed<'a> {
    pub fn new(layout: &'a Layout, validation: &'a ValidationConfig) -> Self {
        Self { layout, validation }
    }
}

impl Guard<Task> for HasAllWavesPassed<'_> {
    fn id(&self) -> &str {
        guards::HAS_ALL_WAVES_PASSED
    }

    fn check(&self, task: &Task) -> GuardOutcome {
        if self.validation.waves.is_empty() {
            return GuardOutcome::Allow;
        }
        let summary = match load_summary(self.layout, task) {
            Ok(summary) => summary,
            Err(deny) => return deny,
        };
        for wave in &self.validation.waves {
            for validator in &wave.validators {
                let passed = summary
                    .validators
                    .iter()
                    .any(|entry| &entry.id == validator && !entry.status.is_rejected());
                if !passed {
                    return GuardOutcome::deny(format!(
                        "wave {} has no approved status for {validator}; \
                         re-run `edison qa validate {} --execute`",
                        wave.name, summary.root_task
                    ));
                }
            }
        }
        GuardOutcome::Allow
    }
}

/// The three guards the task machine requires on `done -> validated`.
pub struct PromotionGuards<'a> {
    pub bundle: HasBundleApproval<'a>,
    pub evidence: HasRequiredEvidence<'a>,
    pub waves: HasAllWavesPassed<'a>,
}

impl<'a> PromotionGuards<'a> {
    pub fn as_refs(&self) -> [&dyn Guard<Task>; 3] {
        [&self.bundle, &self.evidence, &self.waves]
    }
}

pub fn promotion_guards<'a>(
    layout: &'a Layout,
    validation: &'a ValidationConfig,
) -> PromotionGuards<'a> {
    PromotionGuards {
        bundle: HasBundleApproval::new(layout),
        evidence: HasRequiredEvidence::new(layout, validation),
        waves: HasAllWavesPassed::new(layout, validation),
    }
}

#[cfg(test)]
#[path = "guards_tests.rs"]
mod tests;
