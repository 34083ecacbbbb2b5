// SPDX-License-Identifier: MIT

//! `fm stop [--force]` — graceful shutdown of the background server, with
//! an optional forced kill if it doesn't exit in time.

use crate::client::{discover, ControlClient};
use crate::error::CliError;
use crate::output::{format_or_json, OutputFormat};
use clap::Args;
use foreman_core::ErrorKind;
use foreman_serve::probe::pid_is_alive;
use std::path::Path;
use std::time::{Duration, Instant};

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args)]
pub struct StopArgs {
    /// Send a kill signal if the server hasn't exited within the deadline
    #[arg(long)]
    pub force: bool,
}

pub async fn run(repo_root: &Path, args: StopArgs, format: OutputFormat) -> Result<(), CliError> {
    stop(repo_root, args, format, SHUTDOWN_DEADLINE).await
}

async fn stop(repo_root: &Path, args: StopArgs, format: OutputFormat, deadline: Duration) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);

    let record = match discover(&paths)? {
        Some(record) => record,
        None => {
            format_or_json(format, &serde_json::json!({ "stopped": false }), || println!("No foreman server is running."))?;
            return Ok(());
        }
    };

    let client = ControlClient::new(record.url.clone());
    let _ = client.shutdown().await;

    let deadline = Instant::now() + deadline;
    while Instant::now() < deadline {
        if !pid_is_alive(record.pid) {
            let _ = std::fs::remove_file(paths.server_discovery_file());
            format_or_json(format, &serde_json::json!({ "stopped": true, "forced": false }), || println!("Foreman server stopped."))?;
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    if !args.force {
        return Err(CliError::new(
            ErrorKind::RequestTimeout,
            format!("foreman server (pid {}) did not exit within {:?}", record.pid, SHUTDOWN_DEADLINE),
        )
        .with_hints(["pass --force to send a kill signal"]));
    }

    nix::sys::signal::kill(nix::unistd::Pid::from_raw(record.pid as i32), nix::sys::signal::Signal::SIGKILL)
        .map_err(|e| CliError::new(ErrorKind::ServerUnreachable, format!("failed to kill pid {}: {e}", record.pid)))?;
    let _ = std::fs::remove_file(paths.server_discovery_file());

    format_or_json(format, &serde_json::json!({ "stopped": true, "forced": true }), || println!("Foreman server killed."))?;
    Ok(())
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
