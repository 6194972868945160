// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL audit streams.
//!
//! Each record is one line of JSON. Appends hold an advisory lock, chain
//! the previous line's SHA-256 into `prev_hash`, clamp timestamps to keep
//! the stream monotonic, and fsync before the lock is released. Streams
//! are never rewritten.

use crate::atomic;
use crate::lock::FileLock;
use edison_core::error::{Error, Result};
use edison_core::event::{line_hash, AuditEvent};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Bytes read from the end of a stream for `tail()`.
const TAIL_READ_BYTES: u64 = 64 * 1024;

/// One append-only JSONL stream.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, returning it as written (with `prev_hash` set
    /// and the timestamp clamped to stream monotonicity).
    pub fn append(&self, mut event: AuditEvent) -> Result<AuditEvent> {
        atomic::ensure_parent(&self.path)?;
        let lock_path = self.path.with_extension("jsonl.lock");
        let _lock = FileLock::acquire(&lock_path)?;

        if let Some(last_line) = self.last_line()? {
            event.prev_hash = Some(line_hash(&last_line));
            if let Ok(last) = serde_json::from_str::<AuditEvent>(&last_line) {
                if event.ts < last.ts {
                    event.ts = last.ts;
                }
            }
        }

        let line =
            serde_json::to_string(&event).map_err(|e| Error::Validation(e.to_string()))?;
        if line.contains('\n') {
            return Err(Error::Validation(
                "audit record serialized to multiple lines".to_string(),
            ));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::io(&self.path, e))?;
        file.write_all(b"\n").map_err(|e| Error::io(&self.path, e))?;
        file.flush().map_err(|e| Error::io(&self.path, e))?;
        file.sync_all().map_err(|e| Error::io(&self.path, e))?;
        Ok(event)
    }

    /// All parseable records in order. Corrupt lines are skipped with a
    /// warning; an absent stream is empty.
    pub fn read_all(&self) -> Result<Vec<AuditEvent>> {
        let Some(content) = atomic::read_text_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(path = %self.path.display(), line = index + 1, error = %e,
                        "skipping corrupt stream record");
                }
            }
        }
        Ok(events)
    }

    /// The most recent records, reading a bounded window from the end of
    /// the file. Safe for hook-path callers on large streams.
    pub fn tail(&self, max: usize) -> Result<Vec<AuditEvent>> {
        let Some(window) = self.tail_window()? else {
            return Ok(Vec::new());
        };
        let mut events: Vec<AuditEvent> = window
            .lines()
            .filter_map(|line| serde_json::from_str(line.trim()).ok())
            .collect();
        if events.len() > max {
            events.drain(..events.len() - max);
        }
        Ok(events)
    }

    /// Recompute the hash chain; `false` means a line's `prev_hash` does
    /// not match its predecessor.
    pub fn verify_chain(&self) -> Result<bool> {
        let Some(content) = atomic::read_text_optional(&self.path)? else {
            return Ok(true);
        };
        let mut prev: Option<String> = None;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let Ok(event) = serde_json::from_str::<AuditEvent>(line) else {
                return Ok(false);
            };
            if event.prev_hash != prev {
                return Ok(false);
            }
            prev = Some(line_hash(line));
        }
        Ok(true)
    }

    fn last_line(&self) -> Result<Option<String>> {
        let Some(window) = self.tail_window()? else {
            return Ok(None);
        };
        Ok(window
            .lines()
            .filter(|l| !l.trim().is_empty())
            .next_back()
            .map(|l| l.to_string()))
    }

    /// Read at most `TAIL_READ_BYTES` from the end, aligned to a line
    /// boundary. Returns `None` when the stream does not exist.
    fn tail_window(&self) -> Result<Option<String>> {
        let mut file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| Error::io(&self.path, e))?
            .len();
        let start = len.saturating_sub(TAIL_READ_BYTES);
        file.seek(SeekFrom::Start(start))
            .map_err(|e| Error::io(&self.path, e))?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)
            .map_err(|e| Error::io(&self.path, e))?;
        if start > 0 {
            // Drop the first (possibly partial) line.
            if let Some(pos) = buffer.find('\n') {
                buffer.drain(..=pos);
            }
        }
        Ok(Some(buffer))
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
