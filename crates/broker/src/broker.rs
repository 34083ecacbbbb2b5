// SPDX-License-Identifier: MIT

//! The operator-message broker: the per-turn runtime tying together
//! sessions, the operator backend, the approved-command broker, and the
//! audit log.

use crate::audit::{AuditLog, OperatorTurnRecord, TurnOutcome};
use crate::backend::{OperatorBackend, TurnResult};
use crate::command::{ApprovedCommand, RejectReason};
use crate::envelope::{IdentityBinding, InboundEnvelope};
use crate::resolver::ContextResolver;
use crate::session::{ConversationKey, SessionRegistry};
use foreman_core::{Clock, OperatorSessionId, SystemClock, TurnId};
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Safe bounds on a `respond` message's length, per the turn contract.
pub const SAFE_RESPONSE_MIN: usize = 1;
pub const SAFE_RESPONSE_MAX: usize = 2000;

/// True if `message` satisfies the safe-response bound (1..=2000 chars).
/// A pattern-compile failure can't happen for this fixed literal, but is
/// treated as unsafe rather than panicking.
fn is_safe_response(message: &str) -> bool {
    match Regex::new(r"(?s)^.{1,2000}$") {
        Ok(pattern) => pattern.is_match(message),
        Err(_) => false,
    }
}

const MIN_TURN_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub enabled: bool,
    pub enabled_channels: HashSet<String>,
    pub run_triggers_enabled: bool,
    pub max_sessions: usize,
    pub session_ttl: Duration,
    pub turn_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_channels: HashSet::new(),
            run_triggers_enabled: false,
            max_sessions: 256,
            session_ttl: Duration::from_secs(60 * 60),
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }
}

impl BrokerConfig {
    /// Clamp a configured timeout to the 1s floor.
    pub fn clamped_turn_timeout(&self) -> Duration {
        self.turn_timeout.max(MIN_TURN_TIMEOUT)
    }
}

/// The result surfaced to the caller of `handle_turn`: one of
/// `response | command | reject`, always carrying the turn's identity.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnDecision {
    Response { operator_session_id: OperatorSessionId, operator_turn_id: TurnId, message: String },
    Command { operator_session_id: OperatorSessionId, operator_turn_id: TurnId, command_text: String },
    Reject { operator_session_id: OperatorSessionId, operator_turn_id: TurnId, reason: RejectReason },
}

pub struct OperatorBroker<C: Clock = SystemClock> {
    config: BrokerConfig,
    sessions: Mutex<SessionRegistry>,
    audit: Mutex<AuditLog>,
    backend: Arc<dyn OperatorBackend>,
    resolver: Arc<dyn ContextResolver>,
    clock: C,
}

impl<C: Clock> OperatorBroker<C> {
    pub fn new(config: BrokerConfig, backend: Arc<dyn OperatorBackend>, resolver: Arc<dyn ContextResolver>, audit: AuditLog, clock: C) -> Self {
        let sessions = SessionRegistry::new(config.max_sessions, config.session_ttl);
        Self { config, sessions: Mutex::new(sessions), audit: Mutex::new(audit), backend, resolver, clock }
    }

    pub async fn handle_turn(&self, envelope: InboundEnvelope, binding: &IdentityBinding) -> TurnDecision {
        let ts_ms = self.clock.epoch_ms();
        let now = self.clock.now();
        let turn_id = TurnId::new();
        let key = ConversationKey {
            channel: envelope.channel.clone(),
            tenant_id: envelope.channel_tenant_id.clone(),
            conversation_id: envelope.channel_conversation_id.clone(),
            binding_id: binding.binding_id.as_str().to_string(),
        };
        let session = {
            let mut sessions = self.sessions.lock();
            sessions.get_or_create(key.clone(), &envelope.repo_root, ts_ms, now)
        };
        let session_id = session.operator_session_id;

        if !self.config.enabled || !self.config.enabled_channels.contains(&envelope.channel) {
            return self.reject(&envelope, session_id, turn_id, ts_ms, RejectReason::OperatorDisabled);
        }

        let turn_result = match tokio::time::timeout(self.config.clamped_turn_timeout(), self.backend.run_turn(&envelope, &[])).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                self.audit_error(&envelope, session_id, turn_id, ts_ms, err.to_string());
                return TurnDecision::Response {
                    operator_session_id: session_id,
                    operator_turn_id: turn_id,
                    message: format!("operator_backend_error: turn {} failed, please retry", turn_id.as_str()),
                };
            }
            Err(_) => {
                self.audit_error(&envelope, session_id, turn_id, ts_ms, "timeout".to_string());
                return TurnDecision::Response {
                    operator_session_id: session_id,
                    operator_turn_id: turn_id,
                    message: format!("operator_backend_error: turn {} timed out, please retry", turn_id.as_str()),
                };
            }
        };

        {
            let mut sessions = self.sessions.lock();
            sessions.record_turn(&key, ts_ms);
        }

        match turn_result {
            TurnResult::Respond { message } => self.finish_respond(&envelope, session_id, turn_id, ts_ms, message),
            TurnResult::Command { proposal } => self.finish_command(&envelope, session_id, turn_id, ts_ms, proposal),
        }
    }

    fn finish_respond(&self, envelope: &InboundEnvelope, session_id: OperatorSessionId, turn_id: TurnId, ts_ms: u64, message: String) -> TurnDecision {
        let trimmed = message.trim().to_string();
        let safe = is_safe_response(&trimmed);
        let (outcome_message, reason) = if safe {
            (trimmed, None)
        } else {
            (format!("operator_invalid_output: turn {} produced a response outside safe bounds, please retry", turn_id.as_str()), Some("unsafe_response".to_string()))
        };

        self.append_audit(OperatorTurnRecord {
            ts_ms,
            repo_root: envelope.repo_root.clone(),
            channel: envelope.channel.clone(),
            request_id: envelope.request_id.clone(),
            session_id,
            turn_id,
            outcome: TurnOutcome::Respond,
            reason,
            message_preview: Some(OperatorTurnRecord::truncate_preview(&outcome_message)),
            command: None,
        });

        TurnDecision::Response { operator_session_id: session_id, operator_turn_id: turn_id, message: outcome_message }
    }

    fn finish_command(&self, envelope: &InboundEnvelope, session_id: OperatorSessionId, turn_id: TurnId, ts_ms: u64, proposal: ApprovedCommand) -> TurnDecision {
        if proposal.is_run_trigger() && !self.config.run_triggers_enabled {
            return self.reject(envelope, session_id, turn_id, ts_ms, RejectReason::OperatorActionDisallowed);
        }

        let proposal = normalize_run_start_args(proposal);

        match self.resolver.resolve(&proposal, envelope) {
            Ok(command_text) => {
                self.append_audit(OperatorTurnRecord {
                    ts_ms,
                    repo_root: envelope.repo_root.clone(),
                    channel: envelope.channel.clone(),
                    request_id: envelope.request_id.clone(),
                    session_id,
                    turn_id,
                    outcome: TurnOutcome::Command,
                    reason: None,
                    message_preview: None,
                    command: Some(command_text.clone()),
                });
                TurnDecision::Command { operator_session_id: session_id, operator_turn_id: turn_id, command_text }
            }
            Err(reason) => self.reject(envelope, session_id, turn_id, ts_ms, reason),
        }
    }

    fn reject(&self, envelope: &InboundEnvelope, session_id: OperatorSessionId, turn_id: TurnId, ts_ms: u64, reason: RejectReason) -> TurnDecision {
        self.append_audit(OperatorTurnRecord {
            ts_ms,
            repo_root: envelope.repo_root.clone(),
            channel: envelope.channel.clone(),
            request_id: envelope.request_id.clone(),
            session_id,
            turn_id,
            outcome: TurnOutcome::InvalidDirective,
            reason: Some(reason.to_string()),
            message_preview: None,
            command: None,
        });
        TurnDecision::Reject { operator_session_id: session_id, operator_turn_id: turn_id, reason }
    }

    fn audit_error(&self, envelope: &InboundEnvelope, session_id: OperatorSessionId, turn_id: TurnId, ts_ms: u64, reason: String) {
        self.append_audit(OperatorTurnRecord {
            ts_ms,
            repo_root: envelope.repo_root.clone(),
            channel: envelope.channel.clone(),
            request_id: envelope.request_id.clone(),
            session_id,
            turn_id,
            outcome: TurnOutcome::Error,
            reason: Some(reason),
            message_preview: None,
            command: None,
        });
    }

    fn append_audit(&self, record: OperatorTurnRecord) {
        let outcome = record.outcome;
        let channel = record.channel.clone();
        let request_id = record.request_id.clone();
        let session_id = record.session_id;
        self.audit.lock().record(&record);
        match outcome {
            TurnOutcome::Respond | TurnOutcome::Command => {
                tracing::info!(%channel, %request_id, %session_id, %outcome, "operator turn");
            }
            TurnOutcome::InvalidDirective | TurnOutcome::Error => {
                tracing::warn!(%channel, %request_id, %session_id, %outcome, reason = record.reason.as_deref().unwrap_or(""), "operator turn");
            }
        }
    }
}

/// Splits `run_start.prompt` into whitespace-separated tokens, trims
/// scalar args, and rejoins. Numeric args already arrive as integers
/// through [`ApprovedCommand`]'s typed fields.
fn normalize_run_start_args(command: ApprovedCommand) -> ApprovedCommand {
    match command {
        ApprovedCommand::RunStart { prompt, max_steps } => {
            let prompt = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
            ApprovedCommand::RunStart { prompt, max_steps }
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
