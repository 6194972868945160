// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative state machines and transition guards.
//!
//! States and transitions form a directed graph; guards are pure predicates
//! evaluated in declared order, and the first denial short-circuits. Guards
//! may read other entities but must not mutate anything.

use crate::error::{Error, Result};
use crate::qa::QaState;
use crate::session::SessionState;
use crate::state::TaskState;

/// Outcome of a guard evaluation. Denials are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Deny { reason: String },
}

impl GuardOutcome {
    pub fn deny(reason: impl Into<String>) -> Self {
        GuardOutcome::Deny {
            reason: reason.into(),
        }
    }
}

/// A pure transition predicate over an entity.
pub trait Guard<E>: Send + Sync {
    /// Stable identifier surfaced in `TransitionBlocked`.
    fn id(&self) -> &str;

    fn check(&self, entity: &E) -> GuardOutcome;
}

/// A guard built from a closure, for ad-hoc and test guards.
pub struct FnGuard<E> {
    id: String,
    check: Box<dyn Fn(&E) -> GuardOutcome + Send + Sync>,
}

impl<E> FnGuard<E> {
    pub fn new(
        id: impl Into<String>,
        check: impl Fn(&E) -> GuardOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            check: Box::new(check),
        }
    }
}

impl<E> Guard<E> for FnGuard<E> {
    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self, entity: &E) -> GuardOutcome {
        (self.check)(entity)
    }
}

/// One edge of the transition graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: String,
    pub to: String,
    /// Guard ids evaluated in declared order.
    pub guards: Vec<String>,
}

impl TransitionRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            guards: Vec::new(),
        }
    }

    pub fn with_guards(mut self, guards: &[&str]) -> Self {
        self.guards = guards.iter().map(|g| g.to_string()).collect();
        self
    }
}

/// A directed transition graph over named states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    pub states: Vec<String>,
    pub transitions: Vec<TransitionRule>,
}

impl StateMachine {
    pub fn new(states: &[&str], transitions: Vec<TransitionRule>) -> Result<Self> {
        let machine = Self {
            states: states.iter().map(|s| s.to_string()).collect(),
            transitions,
        };
        for rule in &machine.transitions {
            for state in [&rule.from, &rule.to] {
                if !machine.states.iter().any(|s| s == state) {
                    return Err(Error::Config(format!(
                        "transition references unknown state: {state}"
                    )));
                }
            }
        }
        Ok(machine)
    }

    /// Whether the machine knows this state at all.
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Look up the configured rule for `(from -> to)`.
    pub fn find(&self, from: &str, to: &str) -> Option<&TransitionRule> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
    }

    /// Find the rule or explain the denial.
    pub fn require(&self, from: &str, to: &str) -> Result<&TransitionRule> {
        if !self.has_state(to) {
            return Err(Error::Validation(format!("unknown state: {to}")));
        }
        self.find(from, to).ok_or_else(|| Error::TransitionBlocked {
            guard: "state_machine".to_string(),
            reason: format!("no transition from {from} to {to}"),
        })
    }

    /// States with no outgoing transitions.
    pub fn terminal_states(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|s| !self.transitions.iter().any(|t| &t.from == *s))
            .map(|s| s.as_str())
            .collect()
    }
}

/// Built-in task machine.
///
/// `todo → wip` is guarded by dependency readiness; `done → validated` by
/// the three promotion guards. `wip → todo` is the explicit reclaim,
/// `done → wip` the declared reopen. `archived` is terminal.
pub fn task_machine() -> StateMachine {
    let states: Vec<&str> = TaskState::ALL.iter().map(|s| s.as_str()).collect();
    let transitions = vec![
        TransitionRule::new("todo", "wip").with_guards(&[guards::DEPENDENCIES_SATISFIED]),
        TransitionRule::new("wip", "todo"),
        TransitionRule::new("wip", "blocked"),
        TransitionRule::new("blocked", "wip"),
        TransitionRule::new("wip", "done"),
        TransitionRule::new("done", "wip"),
        TransitionRule::new("done", "validated").with_guards(&[
            guards::HAS_BUNDLE_APPROVAL,
            guards::HAS_REQUIRED_EVIDENCE,
            guards::HAS_ALL_WAVES_PASSED,
        ]),
        TransitionRule::new("validated", "archived"),
    ];
    // States come from the canonical enum; no validation needed.
    StateMachine {
        states: states.iter().map(|s| s.to_string()).collect(),
        transitions,
    }
}

/// Built-in QA record machine. `validated` is terminal.
pub fn qa_machine() -> StateMachine {
    let states: Vec<&str> = QaState::ALL.iter().map(|s| s.as_str()).collect();
    let transitions = vec![
        TransitionRule::new("pending", "wip"),
        TransitionRule::new("wip", "done"),
        TransitionRule::new("done", "wip"),
        TransitionRule::new("done", "validated"),
        TransitionRule::new("done", "rejected"),
        TransitionRule::new("rejected", "wip"),
    ];
    StateMachine {
        states: states.iter().map(|s| s.to_string()).collect(),
        transitions,
    }
}

/// Built-in session machine. `stale` is derived and does not appear here.
pub fn session_machine() -> StateMachine {
    let states = [
        SessionState::Active,
        SessionState::Closing,
        SessionState::Closed,
        SessionState::Archived,
    ];
    let names: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
    let transitions = vec![
        TransitionRule::new("active", "closing"),
        TransitionRule::new("closing", "closed"),
        TransitionRule::new("closed", "archived"),
    ];
    StateMachine {
        states: names.iter().map(|s| s.to_string()).collect(),
        transitions,
    }
}

/// Well-known guard ids.
pub mod guards {
    pub const DEPENDENCIES_SATISFIED: &str = "dependenciesSatisfied";
    pub const HAS_BUNDLE_APPROVAL: &str = "hasBundleApproval";
    pub const HAS_REQUIRED_EVIDENCE: &str = "hasRequiredEvidence";
    pub const HAS_ALL_WAVES_PASSED: &str = "hasAllWavesPassed";
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
