// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identity as perceived by the identity resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Orchestrator,
    Agent,
    Validator,
    #[default]
    Unknown,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorKind::Orchestrator => f.write_str("orchestrator"),
            ActorKind::Agent => f.write_str("agent"),
            ActorKind::Validator => f.write_str("validator"),
            ActorKind::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for ActorKind {
    // Unknown values fail open to `Unknown`; the resolver decides whether
    // that is acceptable.
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "orchestrator" => ActorKind::Orchestrator,
            "agent" => ActorKind::Agent,
            "validator" => ActorKind::Validator,
            _ => ActorKind::Unknown,
        })
    }
}

/// Resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Actor {
    pub fn new(kind: ActorKind, id: Option<String>) -> Self {
        Self { kind, id }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.kind, id),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
