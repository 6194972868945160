// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory file locks.
//!
//! Cross-process mutual exclusion on a single host via `fs2` exclusive
//! locks, with bounded retry and exponential backoff. Lock files are
//! created but never deleted, which avoids unlink races on the lock path
//! itself. Not designed for networked filesystems with weak rename
//! semantics.

use edison_core::error::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::trace;

/// Retry behavior for lock acquisition.
#[derive(Debug, Clone)]
pub struct LockOptions {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            max_retries: 20,
            base_delay_ms: 5,
            max_delay_ms: 500,
        }
    }
}

/// An exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, retrying with exponential backoff.
    pub fn acquire(path: &Path) -> Result<Self> {
        Self::acquire_with(path, &LockOptions::default())
    }

    pub fn acquire_with(path: &Path, options: &LockOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io(path, e))?;

        let mut delay = options.base_delay_ms;
        for attempt in 0..=options.max_retries {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    trace!(path = %path.display(), attempt, "acquired file lock");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(delay));
                    delay = (delay * 2).min(options.max_delay_ms);
                }
                Err(e) => return Err(Error::io(path, e)),
            }
        }
        Err(Error::Lock {
            path: path.to_path_buf(),
            reason: format!("still held after {} attempts", options.max_retries + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock errors are unrecoverable at drop time; closing the
        // descriptor releases the lock regardless.
        let _ = fs2::FileExt::unlock(&self.file);
        trace!(path = %self.path.display(), "released file lock");
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
