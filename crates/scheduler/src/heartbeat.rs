// SPDX-License-Identifier: MIT

//! Heartbeat programs: a periodic prod directed at a run target.

use foreman_core::{IssueId, ProgramId, RunId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a heartbeat (or cron) tick acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Run { job_id: Option<RunId>, root_issue_id: Option<IssueId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeMode {
    Nudge,
    Reenqueue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatProgram {
    pub program_id: ProgramId,
    pub title: String,
    pub enabled: bool,
    pub target: Target,
    pub every_ms: u64,
    pub next_trigger_at_ms: u64,
    pub last_triggered_at_ms: Option<u64>,
    pub last_result: Option<String>,
    pub reason: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub wake_mode: WakeMode,
    pub updated_at_ms: u64,
}

impl HeartbeatProgram {
    pub fn new(title: String, target: Target, every_ms: u64, wake_mode: WakeMode, ts_ms: u64) -> Self {
        Self {
            program_id: ProgramId::new(),
            title,
            enabled: true,
            target,
            every_ms,
            next_trigger_at_ms: ts_ms + every_ms,
            last_triggered_at_ms: None,
            last_result: None,
            reason: None,
            metadata: BTreeMap::new(),
            wake_mode,
            updated_at_ms: ts_ms,
        }
    }

    /// `metadata.auto_disable_on_terminal=true` disables the program once
    /// its target run reaches a terminal state.
    pub fn auto_disable_on_terminal(&self) -> bool {
        self.metadata.get("auto_disable_on_terminal").map(|v| v == "true").unwrap_or(false)
    }
}

/// One line of the heartbeat-program journal, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeartbeatLogRecord {
    Created { program: HeartbeatProgram, ts_ms: u64 },
    Updated { program: HeartbeatProgram, ts_ms: u64 },
    Deleted { program_id: ProgramId, ts_ms: u64 },
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
