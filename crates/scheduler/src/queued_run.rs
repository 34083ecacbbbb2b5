// SPDX-License-Identifier: MIT

//! A queued run: one unit of scheduled work against the DAG runner.

use foreman_core::{IssueId, RunId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Interrupted,
}

foreman_core::simple_display! {
    RunStatus {
        Queued => "queued",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Interrupted => "interrupted",
    }
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed | RunStatus::Interrupted)
    }
}

/// Source a queue request came from (CLI, operator broker, heartbeat/cron tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSource {
    Cli,
    Operator,
    Heartbeat,
    Cron,
}

foreman_core::simple_display! {
    RunSource {
        Cli => "cli",
        Operator => "operator",
        Heartbeat => "heartbeat",
        Cron => "cron",
    }
}

/// The current materialized record for one queued run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedRun {
    pub job_id: RunId,
    pub root_issue_id: Option<IssueId>,
    pub prompt: String,
    pub max_steps: u32,
    pub mode: String,
    pub status: RunStatus,
    pub source: RunSource,
    pub started_at_ms: u64,
    pub updated_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    pub exit_code: Option<i32>,
    pub last_progress: Option<String>,
    pub stdout_tail: Vec<String>,
    pub stderr_tail: Vec<String>,
    pub log_hint_paths: Vec<String>,
}

/// Bound on how many lines of stdout/stderr a queued run keeps.
pub const TAIL_LINES: usize = 200;

/// `max_steps` used for runs enqueued by a cron tick, which has no caller
/// around to supply one.
pub const DEFAULT_MAX_STEPS: u32 = 50;

impl QueuedRun {
    pub fn new(prompt: String, max_steps: u32, mode: String, source: RunSource, ts_ms: u64) -> Self {
        Self {
            job_id: RunId::new(),
            root_issue_id: None,
            prompt,
            max_steps,
            mode,
            status: RunStatus::Queued,
            source,
            started_at_ms: ts_ms,
            updated_at_ms: ts_ms,
            finished_at_ms: None,
            exit_code: None,
            last_progress: None,
            stdout_tail: Vec::new(),
            stderr_tail: Vec::new(),
            log_hint_paths: Vec::new(),
        }
    }

    pub fn push_tail(tail: &mut Vec<String>, lines: impl IntoIterator<Item = String>) {
        tail.extend(lines);
        if tail.len() > TAIL_LINES {
            let drop = tail.len() - TAIL_LINES;
            tail.drain(0..drop);
        }
    }
}

/// One line of the queued-run journal, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunJournalRecord {
    Created { run: QueuedRun, ts_ms: u64 },
    Updated { run: QueuedRun, ts_ms: u64 },
}

impl RunJournalRecord {
    pub fn run(&self) -> &QueuedRun {
        match self {
            RunJournalRecord::Created { run, .. } | RunJournalRecord::Updated { run, .. } => run,
        }
    }
}

#[cfg(test)]
#[path = "queued_run_tests.rs"]
mod tests;
