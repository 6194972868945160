// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unified composition report.

use crate::template::TransformOutcome;
use serde::Serialize;

/// Aggregated counters for one composition run. Any error or missing
/// blocking variable makes the run exit non-zero.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeReport {
    pub files_written: u32,
    pub variables_substituted: u32,
    pub variables_missing: Vec<String>,
    pub includes_resolved: u32,
    pub sections_processed: u32,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ComposeReport {
    /// Fold one file's outcome into the run totals.
    pub fn absorb(&mut self, file: &str, outcome: &TransformOutcome) {
        self.files_written += 1;
        self.variables_substituted += outcome.variables_substituted;
        self.includes_resolved += outcome.includes_resolved;
        self.sections_processed += outcome.sections_processed;
        for missing in &outcome.variables_missing {
            let entry = format!("{file}: {missing}");
            if !self.variables_missing.contains(&entry) {
                self.variables_missing.push(entry);
            }
        }
        for warning in &outcome.warnings {
            self.warnings.push(format!("{file}: {warning}"));
        }
    }

    /// Merge a sub-run (per content type) into the whole.
    pub fn merge(&mut self, other: ComposeReport) {
        self.files_written += other.files_written;
        self.variables_substituted += other.variables_substituted;
        self.includes_resolved += other.includes_resolved;
        self.sections_processed += other.sections_processed;
        self.variables_missing.extend(other.variables_missing);
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.variables_missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_accumulates_counters() {
        let mut report = ComposeReport::default();
        let outcome = TransformOutcome {
            content: String::new(),
            includes_resolved: 2,
            sections_processed: 1,
            variables_substituted: 3,
            variables_missing: vec!["config.x".to_string()],
            warnings: vec!["unresolved token: {{x}}".to_string()],
        };
        report.absorb("agents/reviewer", &outcome);
        assert_eq!(report.files_written, 1);
        assert_eq!(report.includes_resolved, 2);
        assert_eq!(report.variables_missing, vec!["agents/reviewer: config.x"]);
        assert!(!report.is_success());
    }

    #[test]
    fn success_requires_no_errors_and_no_missing_vars() {
        let mut report = ComposeReport::default();
        assert!(report.is_success());
        report.errors.push("boom".to_string());
        assert!(!report.is_success());
    }

    #[test]
    fn merge_concatenates() {
        let mut a = ComposeReport {
            files_written: 1,
            ..ComposeReport::default()
        };
        let b = ComposeReport {
            files_written: 2,
            errors: vec!["x".to_string()],
            ..ComposeReport::default()
        };
        a.merge(b);
        assert_eq!(a.files_written, 3);
        assert_eq!(a.errors.len(), 1);
    }
}
