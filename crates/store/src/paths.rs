// SPDX-License-Identifier: MIT

//! Store directory layout.

use std::path::{Path, PathBuf};

/// Default name of the store directory inside a repository root.
pub const DEFAULT_STORE_DIR: &str = ".oj-agent-store";

/// Resolved paths for every file the store subsystem owns.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    /// Resolve store paths rooted at `repo_root/<DEFAULT_STORE_DIR>`.
    pub fn new(repo_root: impl AsRef<Path>) -> Self {
        Self { root: repo_root.as_ref().join(DEFAULT_STORE_DIR) }
    }

    /// Resolve store paths rooted directly at `store_dir` (used by tests and
    /// by deployments that override the default directory name).
    pub fn at(store_dir: impl Into<PathBuf>) -> Self {
        Self { root: store_dir.into() }
    }

    pub fn issues_log(&self) -> PathBuf {
        self.root.join("issues.jsonl")
    }

    pub fn forum_log(&self) -> PathBuf {
        self.root.join("forum.jsonl")
    }

    pub fn events_log(&self) -> PathBuf {
        self.root.join("events.jsonl")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn run_log_dir(&self, root_issue_id: &str) -> PathBuf {
        self.logs_dir().join(root_issue_id)
    }

    pub fn control_plane_dir(&self) -> PathBuf {
        self.root.join("control-plane")
    }

    pub fn heartbeats_log(&self) -> PathBuf {
        self.root.join("heartbeats.jsonl")
    }

    pub fn cron_log(&self) -> PathBuf {
        self.root.join("cron.jsonl")
    }

    pub fn queued_runs_log(&self) -> PathBuf {
        self.control_plane_dir().join("queued_runs.jsonl")
    }

    pub fn server_discovery_file(&self) -> PathBuf {
        self.control_plane_dir().join("server.json")
    }

    pub fn writer_lock_file(&self) -> PathBuf {
        self.control_plane_dir().join("writer.lock")
    }

    pub fn identities_log(&self) -> PathBuf {
        self.control_plane_dir().join("identities.jsonl")
    }

    pub fn commands_log(&self) -> PathBuf {
        self.control_plane_dir().join("commands.jsonl")
    }

    pub fn outbox_log(&self) -> PathBuf {
        self.control_plane_dir().join("outbox.jsonl")
    }

    pub fn policy_file(&self) -> PathBuf {
        self.control_plane_dir().join("policy.json")
    }

    pub fn operator_turns_log(&self) -> PathBuf {
        self.control_plane_dir().join("operator_turns.jsonl")
    }

    pub fn operator_conversations_file(&self) -> PathBuf {
        self.control_plane_dir().join("operator_conversations.json")
    }

    pub fn gitignore_file(&self) -> PathBuf {
        self.root.join(".gitignore")
    }

    /// Write the store's `.gitignore`, claiming the whole directory, the
    /// first time the store is opened. A no-op if present.
    pub fn ensure_gitignore(&self) -> std::io::Result<()> {
        if self.gitignore_file().exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.gitignore_file(), "*\n")
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
