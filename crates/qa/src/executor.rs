// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The validation execution contract.
//!
//! Validators may run in-process or be delegated to an external tool.
//! The executor returns a report; writing evidence files is the runner's
//! job. Cancellation is cooperative: in-flight child processes are
//! killed when the token fires.

use crate::report::{Tracking, ValidationStatus, ValidatorReport};
use edison_core::cancel::CancelToken;
use edison_core::clock::Clock;
use edison_core::config::ValidatorConfig;
use edison_core::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Poll interval while waiting on a delegated process.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// One validator execution request.
#[derive(Debug, Clone)]
pub struct ValidatorRequest {
    pub validator: String,
    pub config: ValidatorConfig,
    /// Root task of the cluster being validated.
    pub root_task: String,
    pub round: u32,
    pub round_dir: PathBuf,
    /// Changed files for the round (union across cluster members).
    pub files: Vec<String>,
}

/// Executors produce a report per validator. Implementations must be
/// side-effect free with respect to entity state.
pub trait ValidatorExecutor: Send + Sync {
    fn execute(&self, request: &ValidatorRequest, cancel: &CancelToken)
        -> Result<ValidatorReport>;
}

/// Partial output accepted from a delegated tool's stdout.
#[derive(Debug, Deserialize)]
struct DelegatedOutput {
    status: ValidationStatus,
    #[serde(default)]
    findings: Vec<crate::report::Finding>,
    #[serde(default)]
    model: Option<String>,
}

/// Delegates to the external command configured on the validator.
///
/// `{validator}`, `{task}`, `{round}`, `{round_dir}` are substituted into
/// the command template; the tool prints a JSON verdict on stdout.
pub struct CommandExecutor<'a> {
    clock: &'a dyn Clock,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    fn render_command(request: &ValidatorRequest) -> Result<String> {
        let template = request.config.command.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "validator {} has no command configured; set validation.validators.{}.command",
                request.validator, request.validator
            ))
        })?;
        Ok(template
            .replace("{validator}", &request.validator)
            .replace("{task}", &request.root_task)
            .replace("{round}", &request.round.to_string())
            .replace("{round_dir}", &request.round_dir.to_string_lossy()))
    }
}

impl ValidatorExecutor for CommandExecutor<'_> {
    fn execute(
        &self,
        request: &ValidatorRequest,
        cancel: &CancelToken,
    ) -> Result<ValidatorReport> {
        cancel.check()?;
        let command = Self::render_command(request)?;
        let started_at = self.clock.now();
        let started = std::time::Instant::now();
        debug!(validator = %request.validator, command = %command, "delegating validator");

        let mut child = std::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| Error::External(format!("could not spawn {command}: {e}")))?;

        let status = loop {
            if cancel.is_cancelled() {
                if let Err(e) = child.kill() {
                    warn!(error = %e, "failed to signal cancelled validator process");
                }
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(WAIT_POLL),
                Err(e) => return Err(Error::External(format!("wait failed: {e}"))),
            }
        };

        let output = child
            .wait_with_output()
            .map_err(|e| Error::External(format!("could not collect output: {e}")))?;
        if !status.success() {
            return Err(Error::External(format!(
                "validator {} exited with {status}: {}",
                request.validator,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let delegated: DelegatedOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
            Error::External(format!(
                "validator {} produced unparseable output: {e}",
                request.validator
            ))
        })?;

        Ok(ValidatorReport {
            validator: request.validator.clone(),
            status: delegated.status,
            findings: delegated.findings,
            tracking: Tracking {
                process_id: uuid::Uuid::new_v4().to_string(),
                started_at,
                completed_at: self.clock.now(),
                duration_ms: started.elapsed().as_millis() as u64,
                model: delegated.model.or_else(|| request.config.model.clone()),
            },
        })
    }
}

/// Canned executor for tests: per-validator statuses with a default.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeExecutor {
    clock: edison_core::clock::FakeClock,
    default: ValidationStatus,
    outcomes: parking_lot::Mutex<std::collections::HashMap<String, ValidationStatus>>,
    executed: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeExecutor {
    pub fn approving(clock: edison_core::clock::FakeClock) -> Self {
        Self {
            clock,
            default: ValidationStatus::Approved,
            outcomes: parking_lot::Mutex::new(std::collections::HashMap::new()),
            executed: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outcome(self, validator: &str, status: ValidationStatus) -> Self {
        self.outcomes.lock().insert(validator.to_string(), status);
        self
    }

    /// Validators executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ValidatorExecutor for FakeExecutor {
    fn execute(
        &self,
        request: &ValidatorRequest,
        cancel: &CancelToken,
    ) -> Result<ValidatorReport> {
        cancel.check()?;
        self.executed.lock().push(request.validator.clone());
        let status = self
            .outcomes
            .lock()
            .get(&request.validator)
            .copied()
            .unwrap_or(self.default);
        let now = self.clock.now();
        Ok(ValidatorReport {
            validator: request.validator.clone(),
            status,
            findings: Vec::new(),
            tracking: Tracking {
                process_id: format!("fake-{}", request.validator),
                started_at: now,
                completed_at: now,
                duration_ms: 1,
                model: request.config.model.clone(),
            },
        })
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
