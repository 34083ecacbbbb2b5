// SPDX-License-Identifier: MIT

//! The server discovery record, `control-plane/server.json`.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// `{ pid, port, url }`. Presence without a live pid means stale; the
/// discoverer is responsible for cleaning it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub pid: u32,
    pub port: u16,
    pub url: String,
}

impl DiscoveryRecord {
    pub fn new(pid: u32, port: u16, url: impl Into<String>) -> Self {
        Self { pid, port, url: url.into() }
    }

    /// Read a newline-terminated JSON record. Missing or malformed files
    /// are reported via `Ok(None)`, treated by callers as "stale; clean".
    pub fn read(path: impl AsRef<Path>) -> io::Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(contents.trim()).ok()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn write(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        std::fs::write(path, line)
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
