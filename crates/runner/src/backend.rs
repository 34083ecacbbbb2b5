// SPDX-License-Identifier: MIT

//! The coding-agent backend boundary. The runner drives whatever
//! implements [`BackendRunner`] one step at a time; this crate ships only
//! [`MockBackendRunner`], a deterministic stand-in for tests.

use crate::error::RunnerError;
use crate::prompt::Role;
use async_trait::async_trait;
use foreman_store::{Issue, Message, Outcome};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Context handed to the backend alongside the composed prompt.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub role: Role,
    pub forum_thread: Vec<Message>,
}

/// What a backend step yielded.
#[derive(Debug, Clone)]
pub struct BackendResult {
    pub outcome: Outcome,
    pub exit_code: i32,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
    pub log_hint_paths: Vec<PathBuf>,
}

/// Runs one DAG-runner step against an external coding-agent backend.
///
/// The runner assumes nothing about how the backend implements a step; it
/// only relies on the yielded outcome and streamed lines.
#[async_trait]
pub trait BackendRunner: Send + Sync {
    async fn run_step(
        &self,
        issue: &Issue,
        context: &StepContext,
        prompt: &str,
    ) -> Result<BackendResult, RunnerError>;
}

/// Deterministic backend for tests: returns pre-scripted results in order,
/// falling back to `Success` once the script is exhausted.
#[derive(Default)]
pub struct MockBackendRunner {
    script: Mutex<VecDeque<BackendResult>>,
}

impl MockBackendRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: BackendResult) -> &Self {
        self.script.lock().push_back(result);
        self
    }

    pub fn push_outcome(&self, outcome: Outcome) -> &Self {
        self.push(BackendResult {
            outcome,
            exit_code: 0,
            stdout_lines: Vec::new(),
            stderr_lines: Vec::new(),
            log_hint_paths: Vec::new(),
        })
    }
}

#[async_trait]
impl BackendRunner for MockBackendRunner {
    async fn run_step(
        &self,
        _issue: &Issue,
        _context: &StepContext,
        _prompt: &str,
    ) -> Result<BackendResult, RunnerError> {
        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or(BackendResult {
            outcome: Outcome::Success,
            exit_code: 0,
            stdout_lines: Vec::new(),
            stderr_lines: Vec::new(),
            log_hint_paths: Vec::new(),
        }))
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
