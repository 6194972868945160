// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-storage: repository layout, atomic file I/O, advisory locks,
//! append-only JSONL streams, the entity frontmatter codec, and the
//! entity repository.

pub mod atomic;
pub mod config;
pub mod entities;
pub mod frontmatter;
pub mod jsonl;
pub mod lock;
pub mod paths;
pub mod repository;

pub use config::ConfigManager;
pub use frontmatter::Document;
pub use jsonl::EventLog;
pub use lock::{FileLock, LockOptions};
pub use paths::Layout;
pub use repository::{
    PersistedEntity, QaStore, SessionStore, TaskStore, TransitionCtx, TransitionOutcome,
};
