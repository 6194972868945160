// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-session: session lifecycle, the canonical session-id resolver,
//! and actor identity.

pub mod actor;
pub mod lifecycle;
pub mod process;
pub mod resolve;

pub use actor::resolve_actor;
pub use lifecycle::{CleanupReport, SessionManager};
pub use process::{classify, ProcessClass, ProcessInfo, ProcessInspector, SysinfoInspector};
pub use resolve::{Resolution, ResolutionSource, SessionResolver};

#[cfg(any(test, feature = "test-support"))]
pub use process::FakeInspector;
