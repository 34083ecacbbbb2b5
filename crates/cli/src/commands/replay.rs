// SPDX-License-Identifier: MIT

//! `fm replay <id|path>` — emit a trace log for a run or issue, or tail a log
//! file directly. Always direct store/filesystem access: replaying a past
//! run never needs a live server, so this never goes through the control
//! plane the way `run`/`runs` do.

use crate::error::CliError;
use crate::output::{handle_list, tail_file, OutputFormat};
use clap::Args;
use foreman_core::ErrorKind;
use foreman_store::EventQuery;
use std::path::Path;

#[derive(Args)]
pub struct ReplayArgs {
    /// A run id, an issue id, or a path to a log file
    pub id_or_path: String,
    #[arg(short = 'n', long, default_value_t = 200)]
    pub lines: usize,
}

pub fn run(repo_root: &Path, args: ReplayArgs, format: OutputFormat) -> Result<(), CliError> {
    let candidate = Path::new(&args.id_or_path);
    if candidate.is_file() {
        return tail_file(candidate, args.lines).map_err(Into::into);
    }

    let store = crate::store_ctx::open(repo_root)?;
    let by_run = store.query_events(EventQuery { run_id: Some(args.id_or_path.as_str().into()), ..Default::default() });
    let by_issue = store.query_events(EventQuery { issue_id: Some(args.id_or_path.as_str().into()), ..Default::default() });

    let mut events = by_run;
    events.extend(by_issue);
    events.sort_by_key(|e| e.ts_ms);

    if events.is_empty() {
        return Err(CliError::new(ErrorKind::NotFound, format!("no trace found for {:?}", args.id_or_path)));
    }

    handle_list(format, &events, "No events.", |items, out| {
        for event in items {
            let _ = write!(out, "[{}] {}", event.ts_ms, event.event_type);
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
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
