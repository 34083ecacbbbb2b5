// SPDX-License-Identifier: MIT

//! `fm resume <root-id>` — reset a root issue's in-progress state and
//! re-enter the DAG runner directly, synchronously, in this process.
//!
//! Unlike `run`, which queues work for the scheduler's worker loop on a
//! live server, `resume` takes the workspace writer lock itself the same
//! way `foreman-serve` does at startup. It is meant for local recovery
//! when no server (or a stuck one) holds the lock.

use crate::error::CliError;
use crate::output::{format_or_json, OutputFormat};
use clap::Args;
use foreman_core::ErrorKind;
use foreman_runner::{DagRunner, MockBackendRunner, RunExit};
use foreman_serve::WriterLock;
use std::path::Path;
use std::sync::Arc;

#[derive(Args)]
pub struct ResumeArgs {
    pub root_id: String,
    #[arg(long, default_value_t = foreman_scheduler::DEFAULT_MAX_STEPS)]
    pub max_steps: u32,
}

pub async fn run(repo_root: &Path, args: ResumeArgs, format: OutputFormat) -> Result<(), CliError> {
    let paths = crate::store_ctx::paths(repo_root);
    let lock = WriterLock::acquire(paths.writer_lock_file())?;

    let store = Arc::new(crate::store_ctx::open(repo_root)?);
    let backend = Arc::new(MockBackendRunner::new());
    let runner = DagRunner::new(store, backend);

    let exit = runner.run(&args.root_id, args.max_steps).await?;
    drop(lock);

    let label = match &exit {
        RunExit::RootFinal => "root_final",
        RunExit::MaxStepsReached => "max_steps_reached",
        RunExit::Deadlock { reason } => {
            return Err(CliError::new(ErrorKind::InvalidInput, format!("root {} deadlocked: {reason}", args.root_id)));
        }
    };

    format_or_json(format, &serde_json::json!({ "root_id": args.root_id, "exit": label }), || {
        println!("{}: {label}", args.root_id);
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "resume_tests.rs"]
mod tests;
