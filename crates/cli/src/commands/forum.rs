// SPDX-License-Identifier: MIT

//! `fm forum <post|read|topics>` — the shared append-only forum log.

use crate::error::CliError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Args)]
pub struct ForumArgs {
    #[command(subcommand)]
    pub command: ForumCommand,
}

#[derive(Subcommand)]
pub enum ForumCommand {
    /// Post a message to a topic
    Post {
        topic: String,
        body: String,
        #[arg(long, default_value = "operator")]
        author: String,
    },
    /// Read the most recent messages on a topic
    Read {
        topic: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List topics, optionally filtered by prefix
    Topics {
        #[arg(long)]
        prefix: Option<String>,
    },
}

pub fn run(repo_root: &Path, args: ForumArgs, format: OutputFormat) -> Result<(), CliError> {
    let store = crate::store_ctx::open(repo_root)?;

    match args.command {
        ForumCommand::Post { topic, body, author } => {
            let message = store.post(&topic, body, author)?;
            format_or_json(format, &message, || println!("Posted to {}", message.topic))?;
        }
        ForumCommand::Read { topic, limit } => {
            let messages = store.read(&topic, limit);
            handle_list(format, &messages, "No messages.", |items, out| {
                for message in items {
                    let _ = writeln!(out, "[{}] {}: {}", message.created_at, message.author, message.body);
                }
            })?;
        }
        ForumCommand::Topics { prefix } => {
            let topics = store.topics(prefix.as_deref());
            handle_list(format, &topics, "No topics.", |items, out| {
                for topic in items {
                    let _ = writeln!(out, "{}  ({} messages)", topic.topic, topic.messages);
                }
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "forum_tests.rs"]
mod tests;
