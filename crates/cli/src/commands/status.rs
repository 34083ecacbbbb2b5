// SPDX-License-Identifier: MIT

//! `fm status` — repo + DAG summary.

use crate::error::CliError;
use crate::output::{format_or_json, OutputFormat};
use foreman_store::{ListFilter, ReadyFilter, Status};
use std::path::Path;

pub fn status(repo_root: &Path, format: OutputFormat) -> Result<(), CliError> {
    let store = crate::store_ctx::open(repo_root)?;

    let all = store.list(ListFilter::default());
    let open = all.iter().filter(|i| i.status == Status::Open).count();
    let in_progress = all.iter().filter(|i| i.status == Status::InProgress).count();
    let closed = all.iter().filter(|i| i.status == Status::Closed).count();
    let ready = store.ready(None, ReadyFilter::default()).len();

    let summary = serde_json::json!({
        "repo_root": repo_root.display().to_string(),
        "issues_total": all.len(),
        "open": open,
        "in_progress": in_progress,
        "closed": closed,
        "ready": ready,
    });

    format_or_json(format, &summary, || {
        println!("Repo: {}", repo_root.display());
        println!("Issues: {} total ({} open, {} in progress, {} closed)", all.len(), open, in_progress, closed);
        println!("Ready to run: {ready}");
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
