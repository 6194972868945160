// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping between entity structs and their on-disk documents.
//!
//! Reads tolerate the legacy per-kind relationship attributes
//! (`parent:`, `depends_on:`, ...); writes always emit the unified
//! `relationships:` list.

use crate::frontmatter::Document;
use edison_core::error::{Error, Result};
use edison_core::qa::QaRecord;
use edison_core::relationship::{self, RelationKind, Relationship};
use edison_core::session::Session;
use edison_core::task::Task;
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

/// Serialize an entity's attributes into an ordered header document.
pub fn to_document<T: Serialize>(entity: &T, body: &str) -> Result<Document> {
    let value =
        serde_yaml::to_value(entity).map_err(|e| Error::Validation(e.to_string()))?;
    let Value::Mapping(mapping) = value else {
        return Err(Error::Validation(
            "entity did not serialize to a mapping".to_string(),
        ));
    };
    let mut header = IndexMap::new();
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(Error::Validation("non-string header key".to_string()));
        };
        header.insert(key, value);
    }
    Ok(Document::new(header, body))
}

fn from_header<T: serde::de::DeserializeOwned>(doc: &Document, kind: &str) -> Result<T> {
    let mapping: serde_yaml::Mapping = doc
        .header
        .iter()
        .map(|(k, v)| (Value::String(k.clone()), v.clone()))
        .collect();
    serde_yaml::from_value(Value::Mapping(mapping))
        .map_err(|e| Error::Validation(format!("invalid {kind} header: {e}")))
}

/// Parse a task file, merging legacy relationship attributes.
pub fn task_from_document(mut doc: Document) -> Result<Task> {
    let legacy = extract_legacy_relationships(&mut doc.header)?;
    let mut task: Task = from_header(&doc, "task")?;
    task.body = doc.body;
    if !legacy.is_empty() {
        task.relationships.extend(legacy);
    }
    relationship::normalize(&mut task.relationships, task.id.as_str())?;
    Ok(task)
}

pub fn task_to_document(task: &Task) -> Result<Document> {
    to_document(task, &task.body)
}

pub fn qa_from_document(doc: Document) -> Result<QaRecord> {
    let mut record: QaRecord = from_header(&doc, "qa record")?;
    record.body = doc.body;
    Ok(record)
}

pub fn qa_to_document(record: &QaRecord) -> Result<Document> {
    to_document(record, &record.body)
}

pub fn session_from_document(doc: Document) -> Result<Session> {
    let mut session: Session = from_header(&doc, "session")?;
    session.body = doc.body;
    Ok(session)
}

pub fn session_to_document(session: &Session) -> Result<Document> {
    to_document(session, &session.body)
}

/// Pull legacy edge attributes out of the header so the unified list is
/// the only place edges live after parse.
fn extract_legacy_relationships(
    header: &mut IndexMap<String, Value>,
) -> Result<Vec<Relationship>> {
    const LEGACY_KEYS: [(&str, RelationKind); 5] = [
        ("parent", RelationKind::Parent),
        ("depends_on", RelationKind::DependsOn),
        ("blocks", RelationKind::Blocks),
        ("related", RelationKind::Related),
        ("bundle_root", RelationKind::BundleRoot),
    ];
    let mut edges = Vec::new();
    for (key, kind) in LEGACY_KEYS {
        let Some(value) = header.shift_remove(key) else {
            continue;
        };
        match value {
            Value::String(target) => edges.push(Relationship::new(kind, target)),
            Value::Sequence(items) => {
                for item in items {
                    match item {
                        Value::String(target) => edges.push(Relationship::new(kind, target)),
                        other => {
                            return Err(Error::Validation(format!(
                                "legacy {key} entry must be a task id, got: {other:?}"
                            )))
                        }
                    }
                }
            }
            Value::Null => {}
            other => {
                return Err(Error::Validation(format!(
                    "legacy {key} must be a task id or list, got: {other:?}"
                )))
            }
        }
    }
    Ok(edges)
}

#[cfg(test)]
#[path = "entities_tests.rs"]
mod tests;
