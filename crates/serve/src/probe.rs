// SPDX-License-Identifier: MIT

//! Server discovery: writing/reading `control-plane/server.json` and
//! probing whether the pid it names is still alive.

use crate::error::ServeResult;
use foreman_wire::DiscoveryRecord;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::Path;

/// Write the discovery record once this server has bound its listener.
pub fn publish(path: impl AsRef<Path>, pid: u32, port: u16, url: impl Into<String>) -> ServeResult<()> {
    DiscoveryRecord::new(pid, port, url).write(path)?;
    Ok(())
}

/// True if `pid` names a live process, checked with the no-op signal 0.
///
/// This only proves the pid is occupied, not that it's this server; callers
/// corroborate with a `/healthz` probe before trusting it (the HTTP side of
/// that probe lives in the CLI's server client, the only crate here that
/// carries `reqwest` as a real, non-dev dependency).
pub fn pid_is_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Discover a running server at `path`. Returns `None` when the record is
/// absent, malformed, or names a dead pid — any of which mean "stale;
/// a fresh server should be started and this record overwritten".
pub fn discover_live(path: impl AsRef<Path>) -> ServeResult<Option<DiscoveryRecord>> {
    let record = match DiscoveryRecord::read(path)? {
        Some(record) => record,
        None => return Ok(None),
    };
    if pid_is_alive(record.pid) {
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
