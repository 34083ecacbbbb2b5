// SPDX-License-Identifier: MIT

//! `fm issues <list|get|create|update|claim|open|close|dep|undep|children|ready|validate>`

use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use foreman_core::ErrorKind;
use foreman_store::{CreateIssueInput, DepType, IssuePatch, ListFilter, Outcome, ReadyFilter, Status};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Args)]
pub struct IssuesArgs {
    #[command(subcommand)]
    pub command: IssuesCommand,
}

#[derive(Subcommand)]
pub enum IssuesCommand {
    /// List issues, optionally filtered
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Get one issue by id or prefix
    Get { id: String },
    /// Create a new issue
    Create {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        priority: Option<u8>,
    },
    /// Patch an existing issue's fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<u8>,
    },
    /// Mark an issue in-progress
    Claim { id: String },
    /// Reopen a closed/in-progress issue
    Open { id: String },
    /// Close an issue with an outcome
    Close { id: String, outcome: String },
    /// Add a dependency edge
    Dep {
        src: String,
        #[arg(value_enum)]
        dep_type: DepTypeArg,
        dst: String,
    },
    /// Remove a dependency edge
    Undep {
        src: String,
        #[arg(value_enum)]
        dep_type: DepTypeArg,
        dst: String,
    },
    /// List an issue's direct children
    Children { id: String },
    /// List the ready frontier
    Ready {
        #[arg(long)]
        root: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        contains: Option<String>,
    },
    /// Check whether a root issue's subtree is terminal-final
    Validate { root: String },
    /// Fold the issue log's history into its current projection
    Compact,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum DepTypeArg {
    Blocks,
    Parent,
}

impl From<DepTypeArg> for DepType {
    fn from(value: DepTypeArg) -> Self {
        match value {
            DepTypeArg::Blocks => DepType::Blocks,
            DepTypeArg::Parent => DepType::Parent,
        }
    }
}

fn parse_status(raw: &str) -> Result<Status, CliError> {
    match raw {
        "open" => Ok(Status::Open),
        "in_progress" | "in-progress" => Ok(Status::InProgress),
        "closed" => Ok(Status::Closed),
        other => Err(CliError::new(ErrorKind::InvalidInput, format!("unknown status {other:?} (expected open, in_progress, closed)"))),
    }
}

fn parse_outcome(raw: &str) -> Result<Outcome, CliError> {
    match raw {
        "success" => Ok(Outcome::Success),
        "failure" => Ok(Outcome::Failure),
        "needs_work" | "needs-work" => Ok(Outcome::NeedsWork),
        "expanded" => Ok(Outcome::Expanded),
        "skipped" => Ok(Outcome::Skipped),
        other => Err(CliError::new(ErrorKind::InvalidInput, format!("unknown outcome {other:?}"))),
    }
}

pub fn run(repo_root: &Path, args: IssuesArgs, format: OutputFormat) -> Result<(), CliError> {
    let store = crate::store_ctx::open(repo_root)?;

    match args.command {
        IssuesCommand::List { status, tag } => {
            let filter = ListFilter { status: status.map(|s| parse_status(&s)).transpose()?, tag };
            let issues = store.list(filter);
            handle_list(format, &issues, "No issues found.", |items, out| {
                for issue in items {
                    let _ = writeln!(out, "{}  {:<11}  {}", issue.id.short(8), issue.status, issue.title);
                }
            })?;
        }
        IssuesCommand::Get { id } => {
            let issue = store.get(&id)?;
            format_or_json(format, &issue, || {
                println!("{}  {}", issue.id, issue.title);
                println!("status: {}  priority: {}", issue.status, issue.priority);
                if let Some(outcome) = issue.outcome {
                    println!("outcome: {outcome}");
                }
                if !issue.tags.is_empty() {
                    println!("tags: {}", issue.tags.iter().cloned().collect::<Vec<_>>().join(", "));
                }
                if !issue.body.is_empty() {
                    println!("\n{}", issue.body);
                }
            })?;
        }
        IssuesCommand::Create { title, body, tags, priority } => {
            let input = CreateIssueInput { body, tags: tags.into_iter().collect::<BTreeSet<_>>(), priority };
            let issue = store.create(title, input)?;
            format_or_json(format, &issue, || println!("Created {}", issue.id))?;
        }
        IssuesCommand::Update { id, title, body, status, priority } => {
            let patch = IssuePatch { title, body, status: status.map(|s| parse_status(&s)).transpose()?, priority, ..Default::default() };
            let issue = store.update(&id, patch)?;
            format_or_json(format, &issue, || println!("Updated {}", issue.id))?;
        }
        IssuesCommand::Claim { id } => {
            let issue = store.claim(&id)?;
            format_or_json(format, &issue, || println!("Claimed {}", issue.id))?;
        }
        IssuesCommand::Open { id } => {
            let issue = store.reopen(&id)?;
            format_or_json(format, &issue, || println!("Reopened {}", issue.id))?;
        }
        IssuesCommand::Close { id, outcome } => {
            let outcome = parse_outcome(&outcome)?;
            let issue = store.close(&id, outcome)?;
            format_or_json(format, &issue, || println!("Closed {} ({})", issue.id, outcome))?;
        }
        IssuesCommand::Dep { src, dep_type, dst } => {
            store.add_dep(&src, dep_type.into(), &dst)?;
            format_or_json(format, &serde_json::json!({ "src": src, "dst": dst }), || println!("Added dependency {src} -> {dst}"))?;
        }
        IssuesCommand::Undep { src, dep_type, dst } => {
            let removed = store.remove_dep(&src, dep_type.into(), &dst)?;
            format_or_json(format, &serde_json::json!({ "removed": removed }), || {
                println!("{}", if removed { "Removed dependency" } else { "No such dependency" })
            })?;
        }
        IssuesCommand::Children { id } => {
            let children = store.children(&id)?;
            handle_list(format, &children, "No children.", |items, out| {
                for issue in items {
                    let _ = writeln!(out, "{}  {:<11}  {}", issue.id.short(8), issue.status, issue.title);
                }
            })?;
        }
        IssuesCommand::Ready { root, tags, contains } => {
            let filter = ReadyFilter { tags, contains, limit: None };
            let issues = store.ready(root.as_deref(), filter)?;
            handle_list(format, &issues, "Nothing ready.", |items, out| {
                for issue in items {
                    let _ = writeln!(out, "{}  {}", issue.id.short(8), issue.title);
                }
            })?;
        }
        IssuesCommand::Validate { root } => {
            let result = store.validate(&root)?;
            format_or_json(format, &serde_json::json!({ "is_final": result.is_final, "reason": result.reason }), || {
                println!("{}: {}", if result.is_final { "final" } else { "not final" }, result.reason)
            })?;
        }
        IssuesCommand::Compact => {
            store.compact()?;
            format_or_json(format, &serde_json::json!({ "compacted": true }), || println!("Compacted issue log"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "issues_tests.rs"]
mod tests;
