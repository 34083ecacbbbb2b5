// SPDX-License-Identifier: MIT

//! `fm serve` — start the background server in the foreground, or report
//! that one is already running.

use crate::client::discover;
use crate::error::CliError;
use crate::output::{format_or_json, OutputFormat};
use clap::Args;
use foreman_core::ErrorKind;
use std::path::Path;
use std::process::Command;

#[derive(Args)]
pub struct ServeArgs {
    /// Run even if a live server was already discovered
    #[arg(long)]
    pub force: bool,
}

pub async fn run(repo_root: &Path, args: ServeArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);

    if !args.force {
        if let Some(record) = discover(&paths)? {
            format_or_json(format, &record, || println!("A foreman server is already running at {}", record.url))?;
            return Ok(());
        }
    }

    let current_exe = std::env::current_exe().map_err(|e| CliError::new(ErrorKind::ServerUnreachable, e.to_string()))?;
    let binary = current_exe.parent().map(|dir| dir.join("foreman-serve")).filter(|p| p.exists()).unwrap_or_else(|| "foreman-serve".into());

    let status = Command::new(&binary)
        .arg("--repo-root")
        .arg(repo_root)
        .status()
        .map_err(|e| CliError::new(ErrorKind::ServerUnreachable, format!("failed to start {}: {e}", binary.display())))?;

    if !status.success() {
        return Err(CliError::new(ErrorKind::ServerUnreachable, format!("foreman-serve exited with status {status}")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "serve_tests.rs"]
mod tests;
