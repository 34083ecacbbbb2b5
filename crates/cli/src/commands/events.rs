// SPDX-License-Identifier: MIT

//! `fm events <list|trace>` — the cross-cutting event journal.

use crate::error::CliError;
use crate::output::{handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_store::EventQuery;
use std::path::Path;

#[derive(Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand)]
pub enum EventsCommand {
    /// List events, optionally filtered
    List {
        #[arg(long = "type")]
        event_type: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        contains: Option<String>,
        #[arg(long)]
        since_ms: Option<u64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show every event recorded for one issue or run
    Trace {
        #[arg(long)]
        issue: Option<String>,
        #[arg(long)]
        run: Option<String>,
    },
}

fn print_events(items: &[foreman_store::EventRecord], out: &mut dyn std::io::Write) {
    for event in items {
        let _ = write!(out, "[{}] {} ({})", event.ts_ms, event.event_type, event.source);
        if let Some(issue_id) = &event.issue_id {
            let _ = write!(out, " issue={issue_id}");
        }
        if let Some(run_id) = &event.run_id {
            let _ = write!(out, " run={run_id}");
        }
        if !event.payload.is_null() {
            let _ = write!(out, " {}", event.payload);
        }
        let _ = writeln!(out);
    }
}

pub fn run(repo_root: &Path, args: EventsArgs, format: OutputFormat) -> Result<(), CliError> {
    let store = crate::store_ctx::open(repo_root)?;

    match args.command {
        EventsCommand::List { event_type, source, contains, since_ms, limit } => {
            let query = EventQuery { event_type, source, contains, since_ms, limit, ..Default::default() };
            let events = store.query_events(query);
            handle_list(format, &events, "No events.", print_events)?;
        }
        EventsCommand::Trace { issue, run } => {
            let query = EventQuery {
                issue_id: issue.as_deref().map(Into::into),
                run_id: run.as_deref().map(Into::into),
                ..Default::default()
            };
            let events = store.query_events(query);
            handle_list(format, &events, "No events for that trace.", print_events)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
