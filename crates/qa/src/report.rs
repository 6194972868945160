// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validator output schema: the `<validator>.json` evidence file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of one validator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "APPROVED_WITH_WARNINGS")]
    ApprovedWithWarnings,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ValidationStatus {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ValidationStatus::Rejected)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Approved => f.write_str("APPROVED"),
            ValidationStatus::ApprovedWithWarnings => f.write_str("APPROVED_WITH_WARNINGS"),
            ValidationStatus::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// One issue raised by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Execution metadata recorded with every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub process_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The full validator output written to `<validator>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorReport {
    pub validator: String,
    pub status: ValidationStatus,
    #[serde(default)]
    pub findings: Vec<Finding>,
    pub tracking: Tracking,
}

impl ValidatorReport {
    /// Human summary written alongside the JSON as `<validator>.md`.
    pub fn markdown_summary(&self) -> String {
        let mut out = format!(
            "# {} - {}\n\nDuration: {}ms\n",
            self.validator, self.status, self.tracking.duration_ms
        );
        if let Some(model) = &self.tracking.model {
            out.push_str(&format!("Model: {model}\n"));
        }
        if self.findings.is_empty() {
            out.push_str("\nNo findings.\n");
        } else {
            out.push_str("\n## Findings\n\n");
            for finding in &self.findings {
                match (&finding.file, finding.line) {
                    (Some(file), Some(line)) => out.push_str(&format!(
                        "- [{}] {file}:{line} - {}\n",
                        finding.severity, finding.message
                    )),
                    (Some(file), None) => out.push_str(&format!(
                        "- [{}] {file} - {}\n",
                        finding.severity, finding.message
                    )),
                    _ => out.push_str(&format!("- [{}] {}\n", finding.severity, finding.message)),
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
