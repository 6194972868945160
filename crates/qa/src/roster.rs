// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Union validator rosters.
//!
//! For a cluster, the executed set is the union of the preset's
//! validators, trigger-matched validators for the round's changed files,
//! and every `always_run` validator. Validators execute once at the root
//! evidence directory; all members share the outputs.

use crate::policy::{build_globset, ResolvedPolicy};
use edison_core::config::ValidationConfig;
use edison_core::error::Result;

/// The ordered, deduplicated validator set for a round. Order follows
/// validator declaration order in the config.
pub fn union_roster(
    validation: &ValidationConfig,
    policy: &ResolvedPolicy,
    changed_files: &[String],
) -> Result<Vec<String>> {
    let mut roster = Vec::new();
    for (id, validator) in &validation.validators {
        let in_preset = policy.roster_filter.iter().any(|v| v == id);
        let triggered = if validator.triggers.is_empty() {
            false
        } else {
            let set = build_globset(&validator.triggers)?;
            changed_files.iter().any(|f| set.is_match(f.as_str()))
        };
        if in_preset || triggered || validator.always_run {
            roster.push(id.clone());
        }
    }
    // Preset entries without a validator definition are kept so the
    // summary can report them as missing rather than silently dropping.
    for id in &policy.roster_filter {
        if !roster.contains(id) {
            roster.push(id.clone());
        }
    }
    Ok(roster)
}

/// Roster members whose failure blocks promotion. Validators without a
/// definition block by default (fail-closed).
pub fn blocking_set(validation: &ValidationConfig, roster: &[String]) -> Vec<String> {
    roster
        .iter()
        .filter(|id| {
            validation
                .validators
                .get(id.as_str())
                .map(|v| v.blocks_on_fail)
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "roster_tests.rs"]
mod tests;
