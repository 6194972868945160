// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed project configuration.
//!
//! Every recognized option is declared here; unknown keys are rejected at
//! load (`deny_unknown_fields` throughout). Defaults make an empty
//! `.edison/config/` directory a working project.

use crate::error::{Error, Result};
use crate::session::{ContinuationMode, ContinuationSettings};
use crate::state::TaskState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root of the typed configuration tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EdisonConfig {
    pub session: SessionConfig,
    pub validation: ValidationConfig,
    pub continuation: ContinuationConfig,
    pub worktrees: WorktreesConfig,
    pub tampering: TamperingConfig,
    pub vendors: VendorsConfig,
    pub compose: ComposeConfig,
}

impl EdisonConfig {
    /// Deserialize from a merged YAML value, surfacing `ConfigError`.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| Error::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    pub recovery: RecoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RecoveryConfig {
    /// When true, claims in a stale session are blocked instead of warned.
    pub block_on_stale: bool,
    pub stale_after_seconds: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            block_on_stale: false,
            stale_after_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ValidationConfig {
    /// Presets in escalation order; position defines severity rank.
    pub presets: IndexMap<String, PresetConfig>,
    pub preset_inference: PresetInference,
    pub validators: IndexMap<String, ValidatorConfig>,
    /// Task states that satisfy a `depends_on` edge.
    pub dependency_satisfied_states: Vec<TaskState>,
    /// Ordered validation waves; each must record an approved status
    /// before promotion.
    pub waves: Vec<ValidationWave>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let mut presets = IndexMap::new();
        presets.insert(
            "quick".to_string(),
            PresetConfig {
                validators: Vec::new(),
                required_evidence: vec!["implementation-report.md".to_string()],
                required_reports: Vec::new(),
            },
        );
        presets.insert(
            "standard".to_string(),
            PresetConfig {
                validators: Vec::new(),
                required_evidence: vec![
                    "implementation-report.md".to_string(),
                    "command-lint.txt".to_string(),
                ],
                required_reports: Vec::new(),
            },
        );
        Self {
            presets,
            preset_inference: PresetInference::default(),
            validators: IndexMap::new(),
            dependency_satisfied_states: vec![TaskState::Validated, TaskState::Archived],
            waves: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Severity rank of a preset (higher = stricter). Unknown presets are
    /// a configuration error at the call site.
    pub fn preset_rank(&self, name: &str) -> Option<usize> {
        self.presets.get_index_of(name)
    }

    pub fn preset(&self, name: &str) -> Result<&PresetConfig> {
        self.presets
            .get(name)
            .ok_or_else(|| Error::Config(format!("unknown validation preset: {name}")))
    }

    /// Validators marked `always_run`, in declared order.
    pub fn always_run_validators(&self) -> Vec<&str> {
        self.validators
            .iter()
            .filter(|(_, v)| v.always_run)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PresetConfig {
    pub validators: Vec<String>,
    pub required_evidence: Vec<String>,
    pub required_reports: Vec<String>,
}

/// Maps changed-file globs to preset buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PresetInference {
    pub buckets: Vec<InferenceBucket>,
    /// Preset used when no bucket matches.
    pub fallback: String,
}

impl Default for PresetInference {
    fn default() -> Self {
        Self {
            buckets: vec![
                InferenceBucket {
                    name: "docs".to_string(),
                    globs: vec![
                        "*.md".to_string(),
                        "*.yaml".to_string(),
                        "*.yml".to_string(),
                        "*.txt".to_string(),
                    ],
                    preset: "quick".to_string(),
                    code: false,
                },
                InferenceBucket {
                    name: "code".to_string(),
                    globs: vec![
                        "*.rs".to_string(),
                        "*.ts".to_string(),
                        "*.tsx".to_string(),
                        "*.js".to_string(),
                        "*.py".to_string(),
                        "*.go".to_string(),
                        "*.sh".to_string(),
                    ],
                    preset: "standard".to_string(),
                    code: true,
                },
            ],
            fallback: "quick".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceBucket {
    pub name: String,
    pub globs: Vec<String>,
    pub preset: String,
    /// Code buckets pin the resolved preset at `standard` or above.
    #[serde(default)]
    pub code: bool,
}

/// Config-backed validator definition (no file per instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ValidatorConfig {
    pub model: Option<String>,
    /// Glob patterns over changed files; empty means preset-membership only.
    pub triggers: Vec<String>,
    pub blocks_on_fail: bool,
    pub always_run: bool,
    pub required_evidence: Vec<String>,
    /// External command template; `{round_dir}`, `{task}`, and
    /// `{validator}` are substituted by the executor.
    pub command: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            model: None,
            triggers: Vec::new(),
            blocks_on_fail: true,
            always_run: false,
            required_evidence: Vec::new(),
            command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationWave {
    pub name: String,
    pub validators: Vec<String>,
}

/// How session completion is judged by `session next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    #[default]
    ParentValidatedChildrenDone,
    AllTasksValidated,
}

impl fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionPolicy::ParentValidatedChildrenDone => {
                f.write_str("parent_validated_children_done")
            }
            CompletionPolicy::AllTasksValidated => f.write_str("all_tasks_validated"),
        }
    }
}

impl FromStr for CompletionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parent_validated_children_done" => Ok(CompletionPolicy::ParentValidatedChildrenDone),
            "all_tasks_validated" => Ok(CompletionPolicy::AllTasksValidated),
            other => Err(Error::Config(format!("unknown completion policy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ContinuationConfig {
    pub enabled: bool,
    pub default_mode: ContinuationMode,
    pub max_iterations: u32,
    pub cooldown_seconds: u64,
    pub stop_on_blocked: bool,
    pub completion_policy: CompletionPolicy,
    /// Per-platform overrides applied after any per-session override.
    pub platform_overrides: IndexMap<String, ContinuationSettings>,
    pub templates: ContinuationTemplates,
}

impl Default for ContinuationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_mode: ContinuationMode::Off,
            max_iterations: 10,
            cooldown_seconds: 0,
            stop_on_blocked: true,
            completion_policy: CompletionPolicy::default(),
            platform_overrides: IndexMap::new(),
            templates: ContinuationTemplates::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ContinuationTemplates {
    /// Continuation prompt; `${session}`, `${command}`, and `${action}`
    /// are substituted when the payload is built.
    pub prompt: String,
}

impl Default for ContinuationTemplates {
    fn default() -> Self {
        Self {
            prompt: "Session ${session} is not complete. Run `${command}` and continue with: ${action}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WorktreesConfig {
    pub shared_state: SharedStateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SharedStateConfig {
    pub mode: String,
    pub meta_branch: String,
    pub meta_path_template: String,
    pub shared_paths: Vec<String>,
}

impl Default for SharedStateConfig {
    fn default() -> Self {
        Self {
            mode: "symlink".to_string(),
            meta_branch: "edison-meta".to_string(),
            meta_path_template: "../{repo}-meta".to_string(),
            shared_paths: vec!["specs/".to_string(), ".project/".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TamperingConfig {
    pub enabled: bool,
    pub protected_dir: String,
    pub platforms: Vec<String>,
    pub mode: String,
}

impl Default for TamperingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            protected_dir: ".edison/_generated".to_string(),
            platforms: Vec::new(),
            mode: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VendorsConfig {
    pub cache: String,
    pub checkout: String,
    pub sources: Vec<VendorSource>,
    pub exports: Vec<VendorExport>,
}

impl Default for VendorsConfig {
    fn default() -> Self {
        Self {
            cache: ".edison/vendors".to_string(),
            checkout: "worktree".to_string(),
            sources: Vec::new(),
            exports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorSource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
}

/// Promotion of vendor content to a first-class entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorExport {
    pub vendor: String,
    pub source_path: String,
    pub content_type: String,
    pub name: String,
    #[serde(default)]
    pub allow_shadowing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ComposeConfig {
    /// Enabled packs in priority order; later packs win.
    pub active_packs: Vec<String>,
    pub include_depth: u32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            active_packs: Vec::new(),
            include_depth: 3,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
