// SPDX-License-Identifier: MIT

//! Append-only, newline-delimited JSON log file.
//!
//! Shared by the issue log, the forum log, and the event log: each record
//! is one JSON value per line. A write appends, flushes, and `sync_data`s
//! before returning, so a crash never leaves a half-written line on disk.
//! A corrupt line is fatal on open: the store refuses to start with a
//! partial projection.

use crate::error::{StoreError, StoreResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A single append-only JSONL file plus the handle used to append to it.
pub struct AppendLog {
    path: PathBuf,
    file: File,
}

impl AppendLog {
    /// Open (creating if absent) the log at `path` for appending.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Flushes and syncs before returning.
    pub fn append<T: Serialize>(&mut self, record: &T) -> StoreResult<()> {
        let mut line = serde_json::to_vec(record).map_err(|e| {
            StoreError::CorruptLog { path: self.path.display().to_string(), detail: e.to_string() }
        })?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        self.file.sync_data()?;
        tracing::debug!(path = %self.path.display(), "appended log record");
        Ok(())
    }

    /// Replay every record in the log in insertion order.
    ///
    /// A malformed line is a fatal error: the store refuses to start with a
    /// partial projection rather than silently skip a corrupt record.
    pub fn read_all<T: DeserializeOwned>(path: impl AsRef<Path>) -> StoreResult<Vec<T>> {
        let path = path.as_ref();
        let Ok(file) = File::open(path) else {
            return Ok(Vec::new());
        };
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line).map_err(|e| StoreError::CorruptLog {
                path: path.display().to_string(),
                detail: format!("line {}: {}", lineno + 1, e),
            })?;
            out.push(record);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
