// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-graph: the only place that mutates or interprets cross-task
//! relationship edges.

pub mod mutate;
pub mod queries;

pub use mutate::RelationshipGraph;
pub use queries::{ready_tasks, Readiness, TaskGraph};
