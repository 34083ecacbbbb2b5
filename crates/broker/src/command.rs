// SPDX-License-Identifier: MIT

//! The closed set of commands an operator proposal may resolve to.

use serde::{Deserialize, Serialize};

/// An operator-proposed command, normalized to the closed set the broker
/// will act on. Anything outside this set is not representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ApprovedCommand {
    Status,
    Ready,
    IssueList,
    IssueGet { issue_id: Option<String> },
    ForumRead { topic: Option<String>, limit: Option<u32> },
    RunList,
    RunStatus { root_issue_id: Option<String> },
    RunResume { root_issue_id: Option<String>, max_steps: Option<u32> },
    RunInterrupt { root_issue_id: Option<String> },
    RunStart { prompt: String, max_steps: Option<u32> },
}

impl ApprovedCommand {
    /// Stable key used to look up run-trigger gating and to audit the turn.
    pub fn key(&self) -> &'static str {
        match self {
            ApprovedCommand::Status => "status",
            ApprovedCommand::Ready => "ready",
            ApprovedCommand::IssueList => "issue_list",
            ApprovedCommand::IssueGet { .. } => "issue_get",
            ApprovedCommand::ForumRead { .. } => "forum_read",
            ApprovedCommand::RunList => "run_list",
            ApprovedCommand::RunStatus { .. } => "run_status",
            ApprovedCommand::RunResume { .. } => "run_resume",
            ApprovedCommand::RunInterrupt { .. } => "run_interrupt",
            ApprovedCommand::RunStart { .. } => "run_start",
        }
    }

    /// Commands that trigger a new or resumed DAG run, gated by the
    /// runtime's run-triggers flag.
    pub fn is_run_trigger(&self) -> bool {
        matches!(self, ApprovedCommand::RunStart { .. } | ApprovedCommand::RunResume { .. } | ApprovedCommand::RunInterrupt { .. })
    }

    /// Validate and clamp field bounds (`limit` and `max_steps` in
    /// `[1..500]`, `prompt` non-empty), returning a validation failure
    /// reason on violation.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            ApprovedCommand::ForumRead { limit: Some(limit), .. } if !(1..=500).contains(limit) => {
                Err("forum_read.limit out of range")
            }
            ApprovedCommand::RunResume { max_steps: Some(steps), .. } if !(1..=500).contains(steps) => {
                Err("run_resume.max_steps out of range")
            }
            ApprovedCommand::RunStart { max_steps: Some(steps), .. } if !(1..=500).contains(steps) => {
                Err("run_start.max_steps out of range")
            }
            ApprovedCommand::RunStart { prompt, .. } if prompt.trim().is_empty() => Err("run_start.prompt is empty"),
            _ => Ok(()),
        }
    }
}

/// Why the approved-command broker rejected a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    OperatorDisabled,
    OperatorActionDisallowed,
    ContextMissing,
    ContextAmbiguous,
    ContextUnauthorized,
    CliValidationFailed,
}

foreman_core::simple_display! {
    RejectReason {
        OperatorDisabled => "operator_disabled",
        OperatorActionDisallowed => "operator_action_disallowed",
        ContextMissing => "context_missing",
        ContextAmbiguous => "context_ambiguous",
        ContextUnauthorized => "context_unauthorized",
        CliValidationFailed => "cli_validation_failed",
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
