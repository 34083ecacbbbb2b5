// SPDX-License-Identifier: MIT

//! Exclusive writer lock: one server process per workspace store.

use crate::error::{ServeError, ServeResult};
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Holds the workspace writer lock for the process's lifetime. Dropping it
/// releases the lock; the file itself is left behind for the next server to
/// re-acquire.
pub struct WriterLock {
    #[allow(dead_code)]
    file: File,
}

impl WriterLock {
    /// Acquire the lock at `path`, writing this process's pid once held.
    ///
    /// Opened without truncation before the lock is held, so a losing
    /// contender never wipes the winner's pid.
    pub fn acquire(path: impl AsRef<Path>) -> ServeResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
        file.try_lock_exclusive().map_err(|_| ServeError::LockFailed)?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        Ok(Self { file })
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
