// SPDX-License-Identifier: MIT

//! `fm cron <list|create|update|delete>`

use crate::client::discover_or_spawn;
use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_wire::{CronCreateRequest, CronDeleteRequest, CronUpdateRequest, CronView, ScheduleRequest};
use std::path::Path;

#[derive(Args)]
pub struct CronArgs {
    #[command(subcommand)]
    pub command: CronCommand,
}

#[derive(Subcommand)]
pub enum CronCommand {
    /// List all cron programs and their arming status
    List,
    /// Register a new cron program
    Create {
        title: String,
        prompt: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Patch an existing cron program
    Update {
        program_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Remove a cron program
    Delete { program_id: String },
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Fire every N milliseconds
    #[arg(long, conflicts_with_all = ["at_ms", "cron_expr"])]
    pub every_ms: Option<u64>,
    /// Fire once at this unix-epoch-ms timestamp
    #[arg(long, conflicts_with_all = ["every_ms", "cron_expr"])]
    pub at_ms: Option<u64>,
    /// Fire on a cron expression (requires --tz)
    #[arg(long = "cron", conflicts_with_all = ["every_ms", "at_ms"])]
    pub cron_expr: Option<String>,
    #[arg(long, default_value = "UTC")]
    pub tz: String,
}

impl ScheduleArgs {
    fn into_request(self) -> Result<Option<ScheduleRequest>, CliError> {
        if let Some(every_ms) = self.every_ms {
            return Ok(Some(ScheduleRequest::Every { every_ms }));
        }
        if let Some(at_ms) = self.at_ms {
            return Ok(Some(ScheduleRequest::At { at_ms }));
        }
        if let Some(expr) = self.cron_expr {
            return Ok(Some(ScheduleRequest::Cron { expr, tz: self.tz }));
        }
        Ok(None)
    }

    fn require(self) -> Result<ScheduleRequest, CliError> {
        self.into_request()?.ok_or_else(|| {
            CliError::new(foreman_core::ErrorKind::InvalidInput, "one of --every-ms, --at-ms, or --cron is required")
        })
    }
}

fn print_cron(cron: &CronView, out: &mut dyn std::io::Write) {
    let _ = writeln!(out, "{}  {:<8}  {:<24}  next {}", cron.program_id, if cron.enabled { "enabled" } else { "disabled" }, cron.title, cron.next_run_at_ms);
}

pub async fn run(repo_root: &Path, args: CronArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let client = discover_or_spawn(&paths, repo_root).await?;

    match args.command {
        CronCommand::List => {
            let listing = client.list_cron().await?;
            format_or_json(format, &listing, || {
                if listing.cron.is_empty() {
                    println!("No cron programs.");
                } else {
                    for cron in &listing.cron {
                        print_cron(cron, &mut std::io::stdout());
                    }
                    println!(
                        "\n{} total, {} enabled, {} armed",
                        listing.status.count, listing.status.enabled_count, listing.status.armed_count
                    );
                }
            })?;
        }
        CronCommand::Create { title, prompt, schedule } => {
            let cron = client.create_cron(CronCreateRequest { title, prompt, schedule: schedule.require()? }).await?;
            format_or_json(format, &cron, || println!("Created cron {}", cron.program_id))?;
        }
        CronCommand::Update { program_id, title, prompt, enabled, schedule } => {
            let cron = client
                .update_cron(CronUpdateRequest { program_id, title, prompt, enabled, schedule: schedule.into_request()? })
                .await?;
            format_or_json(format, &cron, || println!("Updated cron {}", cron.program_id))?;
        }
        CronCommand::Delete { program_id } => {
            client.delete_cron(CronDeleteRequest { program_id: program_id.clone() }).await?;
            format_or_json(format, &serde_json::json!({ "deleted": program_id }), || println!("Deleted cron {program_id}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
