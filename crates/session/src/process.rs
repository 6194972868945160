// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process inspection behind a trait so resolution stays testable.
//!
//! The production inspector reads the live process table via `sysinfo`;
//! tests use `FakeInspector` with a scripted process tree.

use std::path::Path;

/// Known LLM wrapper process names, in no particular order.
pub const LLM_WRAPPERS: [&str; 6] = ["claude", "codex", "cursor", "gemini", "opencode", "pal"];

/// A snapshot of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cmdline: Vec<String>,
}

/// Classification of a process for session-id derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessClass {
    /// A known LLM client wrapper; carries the canonical wrapper name.
    LlmWrapper(String),
    /// The Edison CLI itself (including interpreter-launched scripts).
    Edison,
    Other,
}

/// Classify a process by name and command line.
///
/// A process whose script path is an Edison CLI is reclassified as
/// `Edison` even when the OS-reported name is the interpreter.
pub fn classify(info: &ProcessInfo) -> ProcessClass {
    let name = base_name(&info.name);
    if let Some(wrapper) = LLM_WRAPPERS.iter().find(|w| name == **w) {
        return ProcessClass::LlmWrapper((*wrapper).to_string());
    }
    if name == "edison" {
        return ProcessClass::Edison;
    }
    // Interpreter running an Edison script: look at the leading args.
    for arg in info.cmdline.iter().take(3) {
        if base_name(arg) == "edison" {
            return ProcessClass::Edison;
        }
    }
    ProcessClass::Other
}

fn base_name(value: &str) -> String {
    let stem = Path::new(value)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(value);
    stem.to_lowercase()
}

/// Read access to the process table.
pub trait ProcessInspector: Send + Sync {
    /// Whether a reliable process table is available at all. When false,
    /// session-id derivation must return `unresolved` rather than a
    /// stable-looking but wrong id.
    fn available(&self) -> bool {
        true
    }

    fn current_pid(&self) -> u32;

    fn process(&self, pid: u32) -> Option<ProcessInfo>;

    fn parent_of(&self, pid: u32) -> Option<u32>;
}

/// Live process table via `sysinfo`.
pub struct SysinfoInspector {
    system: sysinfo::System,
}

impl SysinfoInspector {
    pub fn new() -> Self {
        let mut system = sysinfo::System::new();
        system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
        Self { system }
    }
}

impl Default for SysinfoInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInspector for SysinfoInspector {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    fn process(&self, pid: u32) -> Option<ProcessInfo> {
        let process = self.system.process(sysinfo::Pid::from_u32(pid))?;
        Some(ProcessInfo {
            pid,
            name: process.name().to_string_lossy().into_owned(),
            cmdline: process
                .cmd()
                .iter()
                .map(|c| c.to_string_lossy().into_owned())
                .collect(),
        })
    }

    fn parent_of(&self, pid: u32) -> Option<u32> {
        self.system
            .process(sysinfo::Pid::from_u32(pid))?
            .parent()
            .map(|p| p.as_u32())
    }
}

/// Scripted process tree for tests.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeInspector {
    current: u32,
    available: bool,
    table: parking_lot::Mutex<std::collections::HashMap<u32, (ProcessInfo, Option<u32>)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeInspector {
    pub fn new(current: u32) -> Self {
        Self {
            current,
            available: true,
            table: parking_lot::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            current: 0,
            available: false,
            table: parking_lot::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn with_process(
        self,
        pid: u32,
        name: &str,
        cmdline: &[&str],
        parent: Option<u32>,
    ) -> Self {
        self.table.lock().insert(
            pid,
            (
                ProcessInfo {
                    pid,
                    name: name.to_string(),
                    cmdline: cmdline.iter().map(|s| s.to_string()).collect(),
                },
                parent,
            ),
        );
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ProcessInspector for FakeInspector {
    fn available(&self) -> bool {
        self.available
    }

    fn current_pid(&self) -> u32 {
        self.current
    }

    fn process(&self, pid: u32) -> Option<ProcessInfo> {
        self.table.lock().get(&pid).map(|(info, _)| info.clone())
    }

    fn parent_of(&self, pid: u32) -> Option<u32> {
        self.table.lock().get(&pid).and_then(|(_, parent)| *parent)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
