// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation context threaded through engine operations.
//!
//! No global state: every operation receives its stores, configuration,
//! clock, and identity explicitly.

use edison_core::actor::Actor;
use edison_core::clock::Clock;
use edison_core::config::EdisonConfig;
use edison_core::event::EventKind;
use edison_core::id::IdGen;
use edison_storage::{EventLog, Layout, QaStore, SessionStore, TaskStore, TransitionCtx};

pub struct EngineCtx<'a, G: IdGen> {
    pub layout: &'a Layout,
    pub config: &'a EdisonConfig,
    pub tasks: &'a TaskStore,
    pub qa: &'a QaStore,
    pub sessions: &'a SessionStore,
    pub clock: &'a dyn Clock,
    pub actor: Actor,
    pub id_gen: G,
}

impl<'a, G: IdGen> EngineCtx<'a, G> {
    pub fn transitions(&self) -> EventLog {
        EventLog::new(self.layout.stream_file(EventKind::Transition))
    }

    pub fn transition_ctx<'b>(
        &'b self,
        transitions: &'b EventLog,
        reason: Option<String>,
    ) -> TransitionCtx<'b> {
        TransitionCtx {
            actor: self.actor.clone(),
            reason,
            clock: self.clock,
            transitions,
        }
    }
}
