// SPDX-License-Identifier: MIT

//! `fm run <prompt>` — queue a run against the scheduler, discovering or
//! spawning the background server first.

use crate::client::discover_or_spawn;
use crate::error::CliError;
use crate::output::{format_or_json, OutputFormat};
use clap::Args;
use foreman_wire::RunStartRequest;
use std::path::Path;

#[derive(Args)]
pub struct RunArgs {
    /// Prompt to seed the run with
    pub prompt: String,
    #[arg(long)]
    pub max_steps: Option<u32>,
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub reasoning: Option<String>,
}

pub async fn run(repo_root: &Path, args: RunArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let client = discover_or_spawn(&paths, repo_root).await?;

    let request = RunStartRequest {
        prompt: args.prompt,
        max_steps: args.max_steps,
        provider: args.provider,
        model: args.model,
        reasoning: args.reasoning,
    };
    let queued = client.start_run(request).await?;

    format_or_json(format, &queued, || {
        println!("Queued run {} ({})", queued.job_id, queued.status);
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
