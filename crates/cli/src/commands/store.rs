// SPDX-License-Identifier: MIT

//! `fm store <paths|ls|tail>` — raw, read-only inspection of the on-disk
//! workspace store. Unlike `issues`/`forum`/`events`, these verbs never open
//! a `WorkspaceStore` projection; they read the append logs and directories
//! directly, so they stay useful even against a corrupt or half-written log.

use crate::error::CliError;
use crate::output::{format_or_json, tail_file, OutputFormat};
use clap::{Args, Subcommand};
use foreman_core::ErrorKind;
use std::path::Path;

#[derive(Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommand,
}

#[derive(Subcommand)]
pub enum StoreCommand {
    /// Print the on-disk paths the store uses
    Paths,
    /// List a root issue's run log directory
    Ls { root: String },
    /// Print the last N lines of a store log file
    Tail {
        /// One of: issues, forum, events, heartbeats, cron, queued-runs
        log: String,
        #[arg(short = 'n', long, default_value_t = 20)]
        lines: usize,
    },
}

pub fn run(repo_root: &Path, args: StoreArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);

    match args.command {
        StoreCommand::Paths => {
            let view = serde_json::json!({
                "issues_log": paths.issues_log().display().to_string(),
                "forum_log": paths.forum_log().display().to_string(),
                "events_log": paths.events_log().display().to_string(),
                "config_file": paths.config_file().display().to_string(),
                "logs_dir": paths.logs_dir().display().to_string(),
                "control_plane_dir": paths.control_plane_dir().display().to_string(),
                "heartbeats_log": paths.heartbeats_log().display().to_string(),
                "cron_log": paths.cron_log().display().to_string(),
                "queued_runs_log": paths.queued_runs_log().display().to_string(),
            });
            format_or_json(format, &view, || {
                println!("issues:       {}", paths.issues_log().display());
                println!("forum:        {}", paths.forum_log().display());
                println!("events:       {}", paths.events_log().display());
                println!("config:       {}", paths.config_file().display());
                println!("logs dir:     {}", paths.logs_dir().display());
                println!("control dir:  {}", paths.control_plane_dir().display());
                println!("heartbeats:   {}", paths.heartbeats_log().display());
                println!("cron:         {}", paths.cron_log().display());
                println!("queued runs:  {}", paths.queued_runs_log().display());
            })?;
        }
        StoreCommand::Ls { root } => {
            let dir = paths.run_log_dir(&root);
            let mut entries = Vec::new();
            if dir.is_dir() {
                for entry in std::fs::read_dir(&dir).map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))? {
                    let entry = entry.map_err(|e| CliError::new(ErrorKind::StorageIo, e.to_string()))?;
                    entries.push(entry.file_name().to_string_lossy().to_string());
                }
            }
            entries.sort();
            crate::output::handle_list(format, &entries, "No run logs.", |items, out| {
                for name in items {
                    let _ = writeln!(out, "{name}");
                }
            })?;
        }
        StoreCommand::Tail { log, lines } => {
            let path = match log.as_str() {
                "issues" => paths.issues_log(),
                "forum" => paths.forum_log(),
                "events" => paths.events_log(),
                "heartbeats" => paths.heartbeats_log(),
                "cron" => paths.cron_log(),
                "queued-runs" => paths.queued_runs_log(),
                other => return Err(CliError::new(ErrorKind::InvalidInput, format!("unknown log {other:?}"))),
            };
            tail_file(&path, lines)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
