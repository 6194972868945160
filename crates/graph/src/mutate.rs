// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-sided relationship mutations.
//!
//! Adding `A depends_on B` also writes `B blocks A`; removals strip both
//! sides. Both task files change in one logical operation with rollback
//! on partial failure.

use edison_core::error::{Error, Result};
use edison_core::relationship::RelationKind;
use edison_storage::TaskStore;
use tracing::debug;

/// Mutation surface over the task store.
pub struct RelationshipGraph<'a> {
    store: &'a TaskStore,
}

impl<'a> RelationshipGraph<'a> {
    pub fn new(store: &'a TaskStore) -> Self {
        Self { store }
    }

    /// Add `a --kind--> b` (and the inverse edge on `b`, if the kind has
    /// one).
    pub fn add(&self, kind: RelationKind, a: &str, b: &str) -> Result<()> {
        match kind.inverse() {
            Some(inverse) => self.store.update_pair(a, b, |task_a, task_b| {
                task_a.add_relationship(kind, b)?;
                task_b.add_relationship(inverse, a)?;
                Ok(())
            })?,
            None => {
                // One-sided kinds (bundle_root) still verify the target
                // exists before writing.
                if self.store.find(b)?.is_none() {
                    return Err(Error::not_found("task", b));
                }
                let mut task = self.store.load(a)?;
                task.add_relationship(kind, b)?;
                self.store.save(&task)?;
            }
        }
        debug!(kind = %kind, from = a, to = b, "relationship added");
        Ok(())
    }

    /// Remove `a --kind--> b` and its inverse.
    pub fn remove(&self, kind: RelationKind, a: &str, b: &str) -> Result<()> {
        match kind.inverse() {
            Some(inverse) => self.store.update_pair(a, b, |task_a, task_b| {
                let removed = task_a.remove_relationship(kind, b);
                task_b.remove_relationship(inverse, a);
                if !removed {
                    return Err(Error::not_found("relationship", format!("{a} {kind} {b}")));
                }
                Ok(())
            })?,
            None => {
                let mut task = self.store.load(a)?;
                if !task.remove_relationship(kind, b) {
                    return Err(Error::not_found("relationship", format!("{a} {kind} {b}")));
                }
                self.store.save(&task)?;
            }
        }
        debug!(kind = %kind, from = a, to = b, "relationship removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mutate_tests.rs"]
mod tests;
