// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn report(status: ValidationStatus) -> ValidatorReport {
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
    ValidatorReport {
        validator: "global-codex".to_string(),
        status,
        findings: vec![Finding {
            severity: "warning".to_string(),
            message: "magic number".to_string(),
            file: Some("src/lib.rs".to_string()),
            line: Some(42),
        }],
        tracking: Tracking {
            process_id: "proc-1".to_string(),
            started_at: at,
            completed_at: at,
            duration_ms: 1200,
            model: Some("sonnet".to_string()),
        },
    }
}

#[test]
fn status_serializes_screaming_case() {
    assert_eq!(
        serde_json::to_string(&ValidationStatus::ApprovedWithWarnings).unwrap(),
        "\"APPROVED_WITH_WARNINGS\""
    );
    assert!(ValidationStatus::Rejected.is_rejected());
    assert!(!ValidationStatus::Approved.is_rejected());
}

#[test]
fn report_round_trips_as_json() {
    let original = report(ValidationStatus::Approved);
    let json = serde_json::to_string_pretty(&original).unwrap();
    assert!(json.contains("\"processId\""));
    let parsed: ValidatorReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn markdown_summary_lists_findings() {
    let md = report(ValidationStatus::Rejected).markdown_summary();
    assert!(md.contains("global-codex - REJECTED"));
    assert!(md.contains("src/lib.rs:42"));
    assert!(md.contains("magic number"));
}

#[test]
fn markdown_summary_without_findings() {
    let mut r = report(ValidationStatus::Approved);
    r.findings.clear();
    assert!(r.markdown_summary().contains("No findings."));
}
