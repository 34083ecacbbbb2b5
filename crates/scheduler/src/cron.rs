// SPDX-License-Identifier: MIT

//! Cron programs: schedule-triggered programs sharing the heartbeat shape.

use crate::error::{SchedulerError, SchedulerResult};
use chrono::{DateTime, TimeZone, Utc};
use foreman_core::ProgramId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The schedule variant driving one cron program's `next_run_at_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Every { every_ms: u64 },
    At { at_ms: u64 },
    Cron { expr: String, tz: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronProgram {
    pub program_id: ProgramId,
    pub title: String,
    /// Prompt handed to a fresh queued run each time the schedule fires.
    pub prompt: String,
    pub enabled: bool,
    pub schedule: Schedule,
    pub next_run_at_ms: u64,
    pub last_triggered_at_ms: Option<u64>,
    pub last_result: Option<String>,
    pub reason: Option<String>,
    pub updated_at_ms: u64,
}

impl CronProgram {
    pub fn new(title: String, prompt: String, schedule: Schedule, ts_ms: u64) -> SchedulerResult<Self> {
        let next_run_at_ms = compute_next_run_at_ms(&schedule, None, ts_ms)?;
        Ok(Self {
            program_id: ProgramId::new(),
            title,
            prompt,
            enabled: true,
            schedule,
            next_run_at_ms,
            last_triggered_at_ms: None,
            last_result: None,
            reason: None,
            updated_at_ms: ts_ms,
        })
    }
}

/// Compute the next fire time for `schedule`, given the previous fire time
/// (if any) and the current tick time.
pub fn compute_next_run_at_ms(schedule: &Schedule, prev_fire_ms: Option<u64>, now_ms: u64) -> SchedulerResult<u64> {
    match schedule {
        Schedule::Every { every_ms } => Ok(prev_fire_ms.map(|p| p + every_ms).unwrap_or(now_ms)),
        Schedule::At { at_ms } => Ok(*at_ms),
        Schedule::Cron { expr, tz } => next_cron_fire_ms(expr, tz, now_ms),
    }
}

fn next_cron_fire_ms(expr: &str, tz: &str, after_ms: u64) -> SchedulerResult<u64> {
    let schedule = cron::Schedule::from_str(expr)
        .map_err(|e| SchedulerError::InvalidCronExpr { expr: expr.to_string(), detail: e.to_string() })?;
    let zone: chrono_tz::Tz = tz
        .parse()
        .map_err(|_| SchedulerError::InvalidCronExpr { expr: expr.to_string(), detail: format!("unknown timezone {tz:?}") })?;

    let after_utc: DateTime<Utc> = Utc
        .timestamp_millis_opt(after_ms as i64)
        .single()
        .ok_or_else(|| SchedulerError::InvalidCronExpr { expr: expr.to_string(), detail: "out-of-range timestamp".into() })?;
    let after_local = after_utc.with_timezone(&zone);

    let next = schedule
        .after(&after_local)
        .next()
        .ok_or_else(|| SchedulerError::InvalidCronExpr { expr: expr.to_string(), detail: "schedule never fires again".into() })?;
    Ok(next.with_timezone(&Utc).timestamp_millis() as u64)
}

/// One line of the cron-program journal, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CronLogRecord {
    Created { program: CronProgram, ts_ms: u64 },
    Updated { program: CronProgram, ts_ms: u64 },
    Deleted { program_id: ProgramId, ts_ms: u64 },
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
