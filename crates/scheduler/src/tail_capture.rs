// SPDX-License-Identifier: MIT

//! A [`RunnerHooks`] implementation that collects backend output lines and
//! the last step's progress note for one queued-run invocation.
//!
//! Output is bounded rather than buffered without limit: a runaway backend
//! could otherwise grow a queued run's captured tail forever.

use foreman_core::IssueId;
use foreman_runner::{RunnerHooks, StepEndEvent};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Maximum total bytes of backend output retained per queued run.
const MAX_TAIL_BYTES: usize = 4 * 1024;

#[derive(Default)]
struct RingTail {
    lines: VecDeque<String>,
    total_bytes: usize,
}

impl RingTail {
    fn push(&mut self, line: String) {
        self.total_bytes += line.len();
        self.lines.push_back(line);
        while self.total_bytes > MAX_TAIL_BYTES {
            let Some(dropped) = self.lines.pop_front() else { break };
            self.total_bytes -= dropped.len();
        }
    }
}

#[derive(Default)]
pub struct TailCapture {
    lines: Mutex<RingTail>,
    last_progress: Mutex<Option<String>>,
}

impl TailCapture {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().lines.iter().cloned().collect()
    }

    pub fn last_progress(&self) -> Option<String> {
        self.last_progress.lock().clone()
    }
}

impl RunnerHooks for TailCapture {
    fn on_backend_line(&self, _issue_id: IssueId, line: &str) {
        self.lines.lock().push(line.to_string());
    }

    fn on_step_end(&self, event: StepEndEvent) {
        *self.last_progress.lock() = Some(format!("{} ({})", event.issue_id, event.outcome));
    }
}
