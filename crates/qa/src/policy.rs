// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation preset resolution.
//!
//! Deterministic mapping from changed files to a preset via configured
//! glob buckets. Safety rule: once any code bucket matches, the resolved
//! preset never drops below `standard`, and explicit overrides are
//! honored only when they escalate.

use edison_core::config::ValidationConfig;
use edison_core::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::debug;

/// The preset floor applied whenever a code bucket matches.
const CODE_FLOOR_PRESET: &str = "standard";

/// Output of preset resolution: the single source of truth for the
/// roster builder, promotion guards, and `session next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPolicy {
    pub preset: String,
    pub required_evidence: Vec<String>,
    pub required_reports: Vec<String>,
    /// Validators requested by the preset itself.
    pub roster_filter: Vec<String>,
}

/// Resolver over the validation section of the config.
pub struct ValidationPolicyResolver<'a> {
    validation: &'a ValidationConfig,
}

impl<'a> ValidationPolicyResolver<'a> {
    pub fn new(validation: &'a ValidationConfig) -> Self {
        Self { validation }
    }

    /// Resolve the preset for a set of changed files, with an optional
    /// explicit override.
    pub fn resolve(
        &self,
        changed_files: &[String],
        override_preset: Option<&str>,
    ) -> Result<ResolvedPolicy> {
        let mut rank = self.rank_of(&self.validation.preset_inference.fallback)?;
        let mut code_matched = false;

        for bucket in &self.validation.preset_inference.buckets {
            let set = build_globset(&bucket.globs)?;
            if changed_files.iter().any(|f| set.is_match(f.as_str())) {
                let bucket_rank = self.rank_of(&bucket.preset)?;
                rank = rank.max(bucket_rank);
                if bucket.code {
                    code_matched = true;
                }
                debug!(bucket = %bucket.name, preset = %bucket.preset, "inference bucket matched");
            }
        }

        if code_matched {
            rank = rank.max(self.rank_of(CODE_FLOOR_PRESET)?);
        }

        if let Some(explicit) = override_preset {
            let explicit_rank = self.rank_of(explicit)?;
            if explicit_rank > rank {
                rank = explicit_rank;
            } else if explicit_rank < rank {
                debug!(
                    explicit,
                    "explicit preset would downgrade the inferred policy; keeping the floor"
                );
            }
        }

        let (name, preset) = self
            .validation
            .presets
            .get_index(rank)
            .ok_or_else(|| Error::Config(format!("no preset at rank {rank}")))?;
        Ok(ResolvedPolicy {
            preset: name.clone(),
            required_evidence: preset.required_evidence.clone(),
            required_reports: preset.required_reports.clone(),
            roster_filter: preset.validators.clone(),
        })
    }

    fn rank_of(&self, preset: &str) -> Result<usize> {
        self.validation
            .preset_rank(preset)
            .ok_or_else(|| Error::Config(format!("unknown validation preset: {preset}")))
    }
}

/// Compile glob patterns, surfacing bad patterns as config errors.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::Config(format!("invalid glob {pattern}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid glob set: {e}")))
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
