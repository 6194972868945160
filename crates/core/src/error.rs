// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Every error carries a stable identifier (`code()`) used by the CLI and
//! by tests, and maps to a process exit code: 1 for user/logic errors,
//! 2 for internal failures, 3 for guard denials.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the Edison core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("transition blocked by {guard}: {reason}")]
    TransitionBlocked { guard: String, reason: String },

    #[error("dependencies unsatisfied for {task}: waiting on {unmet:?}")]
    DependenciesUnsatisfied { task: String, unmet: Vec<String> },

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("resolution failed: {0}")]
    Resolution(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lock on {path} could not be acquired: {reason}")]
    Lock { path: PathBuf, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("external executor failed: {0}")]
    External(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Convenience constructor for I/O failures tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Stable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } | Error::FileNotFound(_) => "not_found",
            Error::Validation(_) => "validation_error",
            Error::TransitionBlocked { .. } => "transition_blocked",
            Error::DependenciesUnsatisfied { .. } => "dependencies_unsatisfied",
            Error::Integrity(_) => "integrity_error",
            Error::Resolution(_) => "resolution_error",
            Error::Io { .. } | Error::Lock { .. } => "io_error",
            Error::Config(_) => "config_error",
            Error::External(_) => "external_error",
            Error::Cancelled => "cancelled",
        }
    }

    /// Process exit code for the CLI contract.
    ///
    /// 1 = user/logic error, 2 = internal failure, 3 = blocked by a guard.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TransitionBlocked { .. } | Error::DependenciesUnsatisfied { .. } => 3,
            Error::Integrity(_) | Error::Io { .. } | Error::Lock { .. } | Error::External(_) => 2,
            _ => 1,
        }
    }

    /// Whether the caller may reasonably retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io { .. } | Error::Lock { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
