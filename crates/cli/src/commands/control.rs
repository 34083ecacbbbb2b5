// SPDX-License-Identifier: MIT

//! `fm control <link|unlink|identities|status|operator|reload>` — identity
//! bindings and operator-broker configuration.

use crate::client::discover_or_spawn;
use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_broker::AssuranceTier;
use foreman_core::{Clock, ErrorKind, SystemClock};
use foreman_serve::WorkspaceConfig;
use foreman_store::AppendLog;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Args)]
pub struct ControlArgs {
    #[command(subcommand)]
    pub command: ControlCommand,
}

#[derive(Subcommand)]
pub enum ControlCommand {
    /// Link a channel identity to a binding id
    Link {
        channel: String,
        channel_tenant_id: String,
        binding_id: String,
        #[arg(long, default_value = "verified")]
        assurance: String,
    },
    /// Unlink a previously linked channel identity
    Unlink { channel: String, channel_tenant_id: String },
    /// List currently linked identities
    Identities,
    /// Show the operator broker's configuration summary
    Status,
    /// Show or update the operator broker's configuration
    Operator {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        run_triggers_enabled: Option<bool>,
    },
    /// Ask the live server to reload its configuration
    Reload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
enum IdentityLogRecord {
    Linked { ts_ms: u64, channel: String, channel_tenant_id: String, binding_id: String, assurance_tier: AssuranceTier },
    Unlinked { ts_ms: u64, channel: String, channel_tenant_id: String },
}

#[derive(Debug, Clone, Serialize)]
struct IdentityView {
    channel: String,
    channel_tenant_id: String,
    binding_id: String,
    assurance_tier: AssuranceTier,
}

fn parse_assurance(raw: &str) -> Result<AssuranceTier, CliError> {
    match raw {
        "unverified" => Ok(AssuranceTier::Unverified),
        "verified" => Ok(AssuranceTier::Verified),
        "elevated" => Ok(AssuranceTier::Elevated),
        other => Err(CliError::new(ErrorKind::InvalidInput, format!("unknown assurance tier {other:?}"))),
    }
}

fn current_identities(repo_root: &Path) -> Result<Vec<IdentityView>, CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let records = AppendLog::read_all::<IdentityLogRecord>(paths.identities_log())
        .map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;

    let mut live: Vec<IdentityView> = Vec::new();
    for record in records {
        match record {
            IdentityLogRecord::Linked { channel, channel_tenant_id, binding_id, assurance_tier, .. } => {
                live.retain(|v| !(v.channel == channel && v.channel_tenant_id == channel_tenant_id));
                live.push(IdentityView { channel, channel_tenant_id, binding_id, assurance_tier });
            }
            IdentityLogRecord::Unlinked { channel, channel_tenant_id, .. } => {
                live.retain(|v| !(v.channel == channel && v.channel_tenant_id == channel_tenant_id));
            }
        }
    }
    Ok(live)
}

pub async fn run(repo_root: &Path, args: ControlArgs, format: OutputFormat) -> Result<(), CliError> {
    match args.command {
        ControlCommand::Link { channel, channel_tenant_id, binding_id, assurance } => {
            let assurance_tier = parse_assurance(&assurance)?;
            let paths = crate::store_ctx::paths(repo_root);
            let mut log = AppendLog::open(paths.identities_log()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            let record = IdentityLogRecord::Linked { ts_ms: SystemClock.epoch_ms(), channel, channel_tenant_id, binding_id, assurance_tier };
            log.append(&record).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            format_or_json(format, &record, || println!("Linked identity"))?;
        }
        ControlCommand::Unlink { channel, channel_tenant_id } => {
            let paths = crate::store_ctx::paths(repo_root);
            let mut log = AppendLog::open(paths.identities_log()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            let record = IdentityLogRecord::Unlinked { ts_ms: SystemClock.epoch_ms(), channel, channel_tenant_id };
            log.append(&record).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            format_or_json(format, &record, || println!("Unlinked identity"))?;
        }
        ControlCommand::Identities => {
            let identities = current_identities(repo_root)?;
            handle_list(format, &identities, "No linked identities.", |items, out| {
                for id in items {
                    let _ = writeln!(out, "{}/{}  ->  {} ({:?})", id.channel, id.channel_tenant_id, id.binding_id, id.assurance_tier);
                }
            })?;
        }
        ControlCommand::Status => {
            let paths = crate::store_ctx::paths(repo_root);
            let config = WorkspaceConfig::load_layered(repo_root, paths.config_file()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            let identities = current_identities(repo_root)?;
            let summary = serde_json::json!({
                "operator_enabled": config.operator.enabled,
                "enabled_channels": config.operator.enabled_channels,
                "run_triggers_enabled": config.operator.run_triggers_enabled,
                "max_sessions": config.operator.max_sessions,
                "identities_linked": identities.len(),
            });
            format_or_json(format, &summary, || {
                println!("Operator enabled: {}", config.operator.enabled);
                println!("Run triggers enabled: {}", config.operator.run_triggers_enabled);
                println!("Max sessions: {}", config.operator.max_sessions);
                println!("Identities linked: {}", identities.len());
            })?;
        }
        ControlCommand::Operator { enabled, run_triggers_enabled } => {
            let paths = crate::store_ctx::paths(repo_root);
            let mut config = WorkspaceConfig::load_layered(repo_root, paths.config_file()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            if enabled.is_none() && run_triggers_enabled.is_none() {
                format_or_json(format, &config.operator, || {
                    println!("enabled: {}", config.operator.enabled);
                    println!("run_triggers_enabled: {}", config.operator.run_triggers_enabled);
                })?;
                return Ok(());
            }
            if let Some(enabled) = enabled {
                config.operator.enabled = enabled;
            }
            if let Some(run_triggers_enabled) = run_triggers_enabled {
                config.operator.run_triggers_enabled = run_triggers_enabled;
            }
            config.save(paths.config_file()).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
            format_or_json(format, &config.operator, || println!("Updated operator configuration"))?;
        }
        ControlCommand::Reload => {
            let paths = crate::store_ctx::paths(repo_root);
            let client = discover_or_spawn(&paths, repo_root).await?;
            let result = client.reload().await?;
            format_or_json(format, &result, || println!("Reloaded: {}", result.reloaded))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
