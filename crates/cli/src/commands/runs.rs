// SPDX-License-Identifier: MIT

//! `fm runs <list|status>` — inspect the scheduler's queued-run registry.

use crate::client::discover_or_spawn;
use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_core::ErrorKind;
use foreman_wire::QueuedRunView;
use std::path::Path;

#[derive(Args)]
pub struct RunsArgs {
    #[command(subcommand)]
    pub command: RunsCommand,
}

#[derive(Subcommand)]
pub enum RunsCommand {
    /// List queued/running/finished runs
    List,
    /// Show one run's full status
    Status { job_id: String },
}

fn print_run(run: &QueuedRunView, out: &mut dyn std::io::Write) {
    let _ = write!(out, "{}  {:<11}  {}", run.job_id, run.status, run.prompt);
    if let Some(progress) = &run.last_progress {
        let _ = write!(out, "  ({progress})");
    }
    let _ = writeln!(out);
}

pub async fn run(repo_root: &Path, args: RunsArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let client = discover_or_spawn(&paths, repo_root).await?;

    match args.command {
        RunsCommand::List => {
            let listing = client.list_runs().await?;
            handle_list(format, &listing.runs, "No runs.", |items, out| {
                for run in items {
                    print_run(run, out);
                }
            })?;
        }
        RunsCommand::Status { job_id } => {
            let listing = client.list_runs().await?;
            let found = listing
                .runs
                .into_iter()
                .find(|r| r.job_id == job_id)
                .ok_or_else(|| CliError::new(ErrorKind::NotFound, format!("no run {job_id:?}")))?;
            format_or_json(format, &found, || print_run(&found, &mut std::io::stdout()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
