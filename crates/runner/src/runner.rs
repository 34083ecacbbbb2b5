// SPDX-License-Identifier: MIT

//! The DAG runner: drives one root issue to completion over its ready
//! frontier, one step at a time.

use crate::backend::{BackendRunner, StepContext};
use crate::error::RunnerResult;
use crate::hooks::{NullHooks, RunnerHooks, StepEndEvent, StepStartEvent};
use crate::prompt::{compose_prompt, Role};
use foreman_core::{Clock, SystemClock};
use foreman_store::issue::well_known_tags;
use foreman_store::{EventRecord, Outcome, ReadyFilter, WorkspaceStore};
use std::sync::Arc;
use std::time::Duration;

/// Default per-step timeout before a backend is treated as crashed.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// How a run of the DAG runner ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit {
    /// The ready frontier emptied and `validate(root)` reported final.
    RootFinal,
    /// The ready frontier emptied without the subtree validating final.
    Deadlock { reason: String },
    /// `max_steps` was reached with the root still unfinished.
    MaxStepsReached,
}

pub struct DagRunner<C: Clock = SystemClock> {
    store: Arc<WorkspaceStore<C>>,
    backend: Arc<dyn BackendRunner>,
    hooks: Arc<dyn RunnerHooks>,
    backend_timeout: Duration,
}

impl<C: Clock> DagRunner<C> {
    pub fn new(store: Arc<WorkspaceStore<C>>, backend: Arc<dyn BackendRunner>) -> Self {
        Self { store, backend, hooks: Arc::new(NullHooks), backend_timeout: DEFAULT_BACKEND_TIMEOUT }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RunnerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Run the root to completion, to a deadlock, or to `max_steps`.
    ///
    /// `reset_in_progress(root)` always runs first, so a crash-resumed
    /// invocation returns any mid-step issue to the ready frontier before
    /// the loop begins.
    pub async fn run(&self, root_id: &str, max_steps: u32) -> RunnerResult<RunExit> {
        let root = self.store.get(root_id)?.id;
        self.store.reset_in_progress(root.as_str())?;

        for step in 0..max_steps {
            let filter = ReadyFilter { tags: vec![well_known_tags::NODE_AGENT.to_string()], ..Default::default() };
            let ready = self.store.ready(Some(root.as_str()), filter)?;
            let Some(issue) = ready.into_iter().next() else {
                let validation = self.store.validate(root.as_str())?;
                return Ok(if validation.is_final {
                    RunExit::RootFinal
                } else {
                    RunExit::Deadlock { reason: validation.reason }
                });
            };

            self.store.claim(issue.id.as_str())?;
            let role = Role::for_issue(&issue);
            let thread = self.store.read(&format!("issue:{}", issue.id), 200);

            self.hooks.on_step_start(StepStartEvent {
                step,
                root_id: root,
                issue_id: issue.id,
                role: role.system_prompt_name(),
                title: issue.title.clone(),
            });

            let prompt = compose_prompt(&issue, &thread, role);
            let ctx = StepContext { role, forum_thread: thread };
            let started = std::time::Instant::now();

            let (outcome, exit_code) =
                match tokio::time::timeout(self.backend_timeout, self.backend.run_step(&issue, &ctx, &prompt)).await {
                    Ok(Ok(result)) => {
                        for line in result.stdout_lines.iter().chain(result.stderr_lines.iter()) {
                            self.hooks.on_backend_line(issue.id, line);
                        }
                        (result.outcome, result.exit_code)
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(issue_id = %issue.id, error = %err, "backend step failed");
                        (Outcome::Failure, -1)
                    }
                    Err(_elapsed) => {
                        tracing::warn!(issue_id = %issue.id, timeout = ?self.backend_timeout, "backend step timed out");
                        (Outcome::Failure, -1)
                    }
                };

            // The chosen issue is always closed before the next iteration,
            // so no issue is ever left in_progress on exit.
            self.store.close(issue.id.as_str(), outcome)?;
            self.store.append_event(
                EventRecord::new("step:end", "runner", self.store.clock().epoch_ms())
                    .with_issue(issue.id)
                    .with_payload(serde_json::json!({ "step": step, "outcome": outcome.to_string() })),
            )?;

            self.hooks.on_step_end(StepEndEvent {
                step,
                issue_id: issue.id,
                outcome,
                elapsed_s: started.elapsed().as_secs_f64(),
                exit_code,
            });
        }

        Ok(RunExit::MaxStepsReached)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
