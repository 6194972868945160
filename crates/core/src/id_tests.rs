// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::TaskId;
use yare::parameterized;

#[parameterized(
    slug = { "001-session-id-inference", true },
    dotted = { "v1.2-fix", true },
    underscored = { "retry_loop", true },
    empty = { "", false },
    leading_dot = { ".hidden", false },
    path_separator = { "tasks/T1", false },
    whitespace = { "T 1", false },
    traversal = { "..", false },
)]
fn slug_validation(raw: &str, ok: bool) {
    assert_eq!(validate_slug("task", raw).is_ok(), ok);
}

#[test]
fn parse_rejects_what_cannot_name_a_file() {
    let err = TaskId::parse("../escape").unwrap_err();
    assert_eq!(err.code(), "validation_error");
    assert!(err.to_string().contains("task id"));

    assert_eq!(TaskId::parse("T1").unwrap(), TaskId::new("T1"));
}

#[test]
fn id_compares_against_str_and_displays_plainly() {
    let id = TaskId::new("001-session-id-inference");
    assert_eq!(id, "001-session-id-inference");
    assert_eq!(id.to_string(), "001-session-id-inference");
    assert_eq!(id.as_str(), "001-session-id-inference");
}

#[test]
fn id_serde_is_transparent() {
    let id = TaskId::new("t-1");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"t-1\"");
    let parsed: TaskId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn sequential_gen_counts_from_one_and_shares_across_clones() {
    let gen = SequentialIdGen::new("cont");
    let clone = gen.clone();
    assert_eq!(gen.next(), "cont-1");
    assert_eq!(clone.next(), "cont-2");
}

#[test]
fn uuid_gen_yields_unique_ids() {
    let gen = UuidIdGen;
    assert_ne!(gen.next(), gen.next());
}
