// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity identifiers and continuation-id generation.
//!
//! Entity ids double as file stems under `.project/`, so anything taken
//! from user input must be a path-safe slug. `entity_id!` stamps out the
//! newtype wrappers; `parse` is the checked entry point, `new` is for
//! ids the engine already owns.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Reject ids that cannot safely name a file: empty strings, leading
/// dots, path separators, whitespace, or anything outside
/// `[A-Za-z0-9._-]`.
pub fn validate_slug(kind: &'static str, raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(Error::Validation(format!("{kind} id may not be empty")));
    }
    if raw.starts_with('.') {
        return Err(Error::Validation(format!(
            "{kind} id may not start with a dot: {raw}"
        )));
    }
    match raw
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
    {
        None => Ok(()),
        Some(bad) => Err(Error::Validation(format!(
            "{kind} id must be a file-safe slug, found {bad:?} in: {raw}"
        ))),
    }
}

/// Define a newtype id whose values name files on disk.
///
/// ```ignore
/// entity_id! {
///     /// Doc comment for the id type.
///     TaskId => "task"
/// }
/// ```
///
/// `parse` validates a slug from user input; `new` wraps a trusted
/// string. Comparisons against `str` are provided so call sites can
/// match ids to literals and header values directly.
#[macro_export]
macro_rules! entity_id {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an id the engine already owns.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Check a slug from user input before it can name a file.
            pub fn parse(raw: &str) -> $crate::Result<Self> {
                $crate::id::validate_slug($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0.as_str() == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

/// Source of continuation ids handed to clients at claim time.
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// UUIDv4 continuation ids for production use.
#[derive(Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `{prefix}-{n}` ids for tests. Clones share the counter.
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::default(),
        }
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
