// SPDX-License-Identifier: MIT

//! The operator-turn audit log. Best-effort: an audit I/O failure never
//! fails the turn it records.

use foreman_core::{OperatorSessionId, TurnId};
use foreman_store::AppendLog;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Respond,
    Command,
    InvalidDirective,
    Error,
}

foreman_core::simple_display! {
    TurnOutcome {
        Respond => "respond",
        Command => "command",
        InvalidDirective => "invalid_directive",
        Error => "error",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorTurnRecord {
    pub ts_ms: u64,
    pub repo_root: String,
    pub channel: String,
    pub request_id: String,
    pub session_id: OperatorSessionId,
    pub turn_id: TurnId,
    pub outcome: TurnOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Truncated to 280 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

const MESSAGE_PREVIEW_MAX: usize = 280;

impl OperatorTurnRecord {
    /// Truncate on a char boundary, unlike `foreman_core::short` which
    /// assumes ASCII ids.
    pub fn truncate_preview(message: &str) -> String {
        match message.char_indices().nth(MESSAGE_PREVIEW_MAX) {
            Some((byte_idx, _)) => message[..byte_idx].to_string(),
            None => message.to_string(),
        }
    }
}

/// Append-only log of operator turns, opened at `operator_turns.jsonl`.
pub struct AuditLog {
    log: AppendLog,
}

impl AuditLog {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        match AppendLog::open(path.as_ref()) {
            Ok(log) => Ok(Self { log }),
            Err(err) => Err(std::io::Error::new(std::io::ErrorKind::Other, err.to_string())),
        }
    }

    /// Append one record. Failures are logged, never propagated: the audit
    /// trail is best-effort and must never fail the turn it describes.
    pub fn record(&mut self, record: &OperatorTurnRecord) {
        if let Err(err) = self.log.append(record) {
            tracing::warn!(error = %err, "failed to append operator-turn audit record");
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
