// SPDX-License-Identifier: MIT

//! The command-context resolver: turns an approved command plus the
//! inbound envelope's addressing context into normalized CLI text, or a
//! rejection reason.

use crate::command::{ApprovedCommand, RejectReason};
use crate::envelope::InboundEnvelope;
use std::sync::Arc;

/// Namespace prefix every resolved command text carries.
pub const COMMAND_NAMESPACE: &str = "fm";

pub trait ContextResolver: Send + Sync {
    fn resolve(&self, command: &ApprovedCommand, envelope: &InboundEnvelope) -> Result<String, RejectReason>;
}

/// The resolver shipped by default: falls back to the inbound envelope's
/// `target_id` when a command omits an explicit id, and (when wired with
/// an active-run check) rejects `run_interrupt` against a run that isn't
/// actually active.
pub struct DefaultContextResolver {
    active_run_check: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl Default for DefaultContextResolver {
    fn default() -> Self {
        Self { active_run_check: None }
    }
}

impl DefaultContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_run_check(check: Arc<dyn Fn(&str) -> bool + Send + Sync>) -> Self {
        Self { active_run_check: Some(check) }
    }

    fn resolve_target(&self, explicit: Option<&str>, want_type: &str, envelope: &InboundEnvelope) -> Result<String, RejectReason> {
        if let Some(id) = explicit {
            return Ok(id.to_string());
        }
        match (&envelope.target_type, &envelope.target_id) {
            (Some(t), Some(id)) if t == want_type => Ok(id.clone()),
            (Some(_), Some(_)) => Err(RejectReason::ContextMissing),
            _ => Err(RejectReason::ContextMissing),
        }
    }
}

impl ContextResolver for DefaultContextResolver {
    fn resolve(&self, command: &ApprovedCommand, envelope: &InboundEnvelope) -> Result<String, RejectReason> {
        command.validate().map_err(|_| RejectReason::CliValidationFailed)?;

        let normalized = match command {
            ApprovedCommand::Status => "status".to_string(),
            ApprovedCommand::Ready => "issues ready".to_string(),
            ApprovedCommand::IssueList => "issues list".to_string(),
            ApprovedCommand::IssueGet { issue_id } => {
                let id = self.resolve_target(issue_id.as_deref(), "issue", envelope)?;
                format!("issues get {id}")
            }
            ApprovedCommand::ForumRead { topic, limit } => {
                let mut text = "forum read".to_string();
                if let Some(topic) = topic {
                    text.push(' ');
                    text.push_str(topic);
                }
                if let Some(limit) = limit {
                    text.push_str(&format!(" --limit {limit}"));
                }
                text
            }
            ApprovedCommand::RunList => "runs list".to_string(),
            ApprovedCommand::RunStatus { root_issue_id } => {
                let id = self.resolve_target(root_issue_id.as_deref(), "run", envelope)?;
                format!("runs status {id}")
            }
            ApprovedCommand::RunResume { root_issue_id, max_steps } => {
                let id = self.resolve_target(root_issue_id.as_deref(), "run", envelope)?;
                match max_steps {
                    Some(steps) => format!("resume {id} --max-steps {steps}"),
                    None => format!("resume {id}"),
                }
            }
            ApprovedCommand::RunInterrupt { root_issue_id } => {
                let id = self.resolve_target(root_issue_id.as_deref(), "run", envelope)?;
                if let Some(check) = &self.active_run_check {
                    if !check(&id) {
                        return Err(RejectReason::CliValidationFailed);
                    }
                }
                format!("runs interrupt {id}")
            }
            ApprovedCommand::RunStart { prompt, max_steps } => {
                let prompt = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
                match max_steps {
                    Some(steps) => format!("run {prompt} --max-steps {steps}"),
                    None => format!("run {prompt}"),
                }
            }
        };

        Ok(format!("/{COMMAND_NAMESPACE} {normalized}"))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
