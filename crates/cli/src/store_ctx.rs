// SPDX-License-Identifier: MIT

//! Opens a fresh `WorkspaceStore`/`StorePaths` against the repo root for
//! each invocation of a store-level verb (`issues`, `forum`, `events`,
//! `store`, `replay`). These are plain journal operations with no
//! autonomous tick loop racing them, unlike the scheduler's queue/
//! heartbeat/cron registries (see `client.rs`), so reading and writing the
//! journal directly here is safe: `WorkspaceStore::open` always rebuilds
//! its projection from the on-disk log.

use foreman_core::SystemClock;
use foreman_store::{StorePaths, WorkspaceStore};

use crate::error::CliError;

pub fn paths(repo_root: &std::path::Path) -> StorePaths {
    StorePaths::new(repo_root)
}

pub fn open(repo_root: &std::path::Path) -> Result<WorkspaceStore<SystemClock>, CliError> {
    Ok(WorkspaceStore::open(repo_root)?)
}
