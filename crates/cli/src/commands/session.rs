// SPDX-License-Identifier: MIT

//! `fm session <list|show|new|resume>` — operator-session management.
//!
//! The broker's live `SessionRegistry` only exists inside a running
//! server process and is never persisted, so `list`/`show` read the
//! durable operator-turn audit log instead (`operator_turns.jsonl`) and
//! group records by session id. `new`/`resume` run one broker turn
//! in-process against the embedded mock backend, the same way
//! `foreman-serve` wires it up for standalone development.

use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_broker::{
    AssuranceTier, AuditLog, DefaultContextResolver, IdentityBinding, InboundEnvelope, MockOperatorBackend, OperatorBroker, TurnDecision,
};
use foreman_core::{BindingId, ErrorKind, SystemClock};
use foreman_store::AppendLog;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List sessions seen in the operator-turn audit log
    List,
    /// Show every turn recorded for one session id
    Show { session_id: String },
    /// Start a fresh one-off operator turn
    New { command_text: String },
    /// Resume (display) the session id recorded in a file
    Resume { file: std::path::PathBuf },
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionSummary {
    session_id: String,
    turns: usize,
    last_outcome: String,
}

fn summarize(repo_root: &Path) -> Result<Vec<foreman_broker::OperatorTurnRecord>, CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    AppendLog::read_all::<foreman_broker::OperatorTurnRecord>(paths.operator_turns_log())
        .map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))
}

pub async fn run(repo_root: &Path, args: SessionArgs, format: OutputFormat) -> Result<(), CliError> {
    match args.command {
        SessionCommand::List => {
            let turns = summarize(repo_root)?;
            let mut sessions: Vec<SessionSummary> = Vec::new();
            for turn in &turns {
                let id = turn.session_id.as_str().to_string();
                match sessions.iter_mut().find(|s| s.session_id == id) {
                    Some(summary) => {
                        summary.turns += 1;
                        summary.last_outcome = turn.outcome.to_string();
                    }
                    None => sessions.push(SessionSummary { session_id: id, turns: 1, last_outcome: turn.outcome.to_string() }),
                }
            }
            handle_list(format, &sessions, "No operator sessions recorded.", |items, out| {
                for s in items {
                    let _ = writeln!(out, "{}  {} turns  last={}", s.session_id, s.turns, s.last_outcome);
                }
            })?;
        }
        SessionCommand::Show { session_id } => {
            let turns: Vec<_> = summarize(repo_root)?.into_iter().filter(|t| t.session_id.as_str() == session_id).collect();
            handle_list(format, &turns, "No turns for that session.", |items, out| {
                for turn in items {
                    let _ = write!(out, "[{}] {}", turn.ts_ms, turn.outcome);
                    if let Some(preview) = &turn.message_preview {
                        let _ = write!(out, " {preview}");
                    }
                    if let Some(command) = &turn.command {
                        let _ = write!(out, " command={command}");
                    }
                    let _ = writeln!(out);
                }
            })?;
        }
        SessionCommand::New { command_text } => {
            let decision = run_one_turn(repo_root, command_text).await?;
            print_decision(format, &decision)?;
        }
        SessionCommand::Resume { file } => {
            let session_id = std::fs::read_to_string(&file).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            let session_id = session_id.trim().to_string();
            return run(repo_root, SessionArgs { command: SessionCommand::Show { session_id } }, format).await;
        }
    }
    Ok(())
}

async fn run_one_turn(repo_root: &Path, command_text: String) -> Result<TurnDecision, CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let audit = AuditLog::open(paths.operator_turns_log()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
    let config = foreman_serve::WorkspaceConfig::load_layered(repo_root, paths.config_file()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
    let mut broker_config = config.operator.into_broker_config();
    broker_config.enabled_channels.insert("cli".to_string());
    let backend = Arc::new(MockOperatorBackend::new());
    let resolver = Arc::new(DefaultContextResolver::new());
    let broker = OperatorBroker::new(broker_config, backend, resolver, audit, SystemClock);

    let envelope = InboundEnvelope {
        channel: "cli".to_string(),
        channel_tenant_id: "local".to_string(),
        channel_conversation_id: "cli".to_string(),
        request_id: format!("cli-{}", std::process::id()),
        repo_root: repo_root.display().to_string(),
        command_text,
        target_type: None,
        target_id: None,
        metadata: Default::default(),
    };
    let binding = IdentityBinding { binding_id: BindingId::new(), assurance_tier: AssuranceTier::Verified };

    Ok(broker.handle_turn(envelope, &binding).await)
}

fn print_decision(format: OutputFormat, decision: &TurnDecision) -> Result<(), CliError> {
    match decision {
        TurnDecision::Response { message, .. } => format_or_json(format, &serde_json::json!({ "kind": "response", "message": message }), || println!("{message}"))?,
        TurnDecision::Command { command_text, .. } => {
            format_or_json(format, &serde_json::json!({ "kind": "command", "command": command_text }), || println!("command: {command_text}"))?
        }
        TurnDecision::Reject { reason, .. } => {
            format_or_json(format, &serde_json::json!({ "kind": "reject", "reason": reason.to_string() }), || println!("rejected: {reason}"))?
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
