// SPDX-License-Identifier: MIT

//! Streaming observation hooks the runner calls at fixed points in a step.

use foreman_core::IssueId;
use foreman_store::Outcome;

#[derive(Debug, Clone)]
pub struct StepStartEvent {
    pub step: u32,
    pub root_id: IssueId,
    pub issue_id: IssueId,
    pub role: &'static str,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct StepEndEvent {
    pub step: u32,
    pub issue_id: IssueId,
    pub outcome: Outcome,
    pub elapsed_s: f64,
    pub exit_code: i32,
}

/// Pluggable observation hooks. Default implementations are no-ops so a
/// caller only needs to override what it cares about.
pub trait RunnerHooks: Send + Sync {
    fn on_step_start(&self, _event: StepStartEvent) {}
    fn on_backend_line(&self, _issue_id: IssueId, _line: &str) {}
    fn on_step_end(&self, _event: StepEndEvent) {}
}

/// The default hook set: observes nothing.
pub struct NullHooks;

impl RunnerHooks for NullHooks {}
