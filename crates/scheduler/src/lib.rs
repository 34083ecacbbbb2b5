// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! foreman-scheduler: the scheduled-run controller. Turns queued-run
//! requests and time-based heartbeat/cron programs into DAG runner
//! invocations, and exposes run/program state through a uniform query
//! surface.

pub mod controller;
pub mod cron;
pub mod error;
pub mod heartbeat;
pub mod queued_run;
pub mod tail_capture;

pub use controller::{CronPatch, CronStatus, HeartbeatPatch, SchedulerController};
pub use cron::{compute_next_run_at_ms, CronLogRecord, CronProgram, Schedule};
pub use error::{SchedulerError, SchedulerResult};
pub use heartbeat::{HeartbeatLogRecord, HeartbeatProgram, Target, WakeMode};
pub use queued_run::{QueuedRun, RunJournalRecord, RunSource, RunStatus, DEFAULT_MAX_STEPS, TAIL_LINES};
pub use tail_capture::TailCapture;
