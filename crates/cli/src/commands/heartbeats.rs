// SPDX-License-Identifier: MIT

//! `fm heartbeats <list|get|create|update|delete>`

use crate::client::discover_or_spawn;
use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_wire::{HeartbeatCreateRequest, HeartbeatDeleteRequest, HeartbeatUpdateRequest, HeartbeatView};
use std::path::Path;

#[derive(Args)]
pub struct HeartbeatsArgs {
    #[command(subcommand)]
    pub command: HeartbeatsCommand,
}

#[derive(Subcommand)]
pub enum HeartbeatsCommand {
    /// List all heartbeat programs
    List,
    /// Show one heartbeat program
    Get { program_id: String },
    /// Register a new heartbeat program
    Create {
        title: String,
        every_ms: u64,
        #[arg(long)]
        target_job_id: Option<String>,
        #[arg(long)]
        target_root_issue_id: Option<String>,
        #[arg(long)]
        wake_mode: Option<String>,
    },
    /// Patch an existing heartbeat program
    Update {
        program_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        every_ms: Option<u64>,
    },
    /// Remove a heartbeat program
    Delete { program_id: String },
}

fn print_heartbeat(hb: &HeartbeatView, out: &mut dyn std::io::Write) {
    let _ = writeln!(out, "{}  {:<8}  {:<24}  every {}ms", hb.program_id, if hb.enabled { "enabled" } else { "disabled" }, hb.title, hb.every_ms);
}

pub async fn run(repo_root: &Path, args: HeartbeatsArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let client = discover_or_spawn(&paths, repo_root).await?;

    match args.command {
        HeartbeatsCommand::List => {
            let listing = client.list_heartbeats().await?;
            handle_list(format, &listing.heartbeats, "No heartbeats.", |items, out| {
                for hb in items {
                    print_heartbeat(hb, out);
                }
            })?;
        }
        HeartbeatsCommand::Get { program_id } => {
            let hb = client.get_heartbeat(&program_id).await?;
            format_or_json(format, &hb, || print_heartbeat(&hb, &mut std::io::stdout()))?;
        }
        HeartbeatsCommand::Create { title, every_ms, target_job_id, target_root_issue_id, wake_mode } => {
            let hb = client
                .create_heartbeat(HeartbeatCreateRequest { title, every_ms, target_job_id, target_root_issue_id, wake_mode })
                .await?;
            format_or_json(format, &hb, || println!("Created heartbeat {}", hb.program_id))?;
        }
        HeartbeatsCommand::Update { program_id, title, enabled, every_ms } => {
            let hb = client.update_heartbeat(HeartbeatUpdateRequest { program_id, title, enabled, every_ms }).await?;
            format_or_json(format, &hb, || println!("Updated heartbeat {}", hb.program_id))?;
        }
        HeartbeatsCommand::Delete { program_id } => {
            client.delete_heartbeat(HeartbeatDeleteRequest { program_id: program_id.clone() }).await?;
            format_or_json(format, &serde_json::json!({ "deleted": program_id }), || println!("Deleted heartbeat {program_id}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "heartbeats_tests.rs"]
mod tests;
