// SPDX-License-Identifier: MIT

//! Request/response DTOs for the HTTP control plane. These mirror the
//! scheduler/broker's internal types without depending on either crate,
//! keeping the wire format stable independent of internal refactors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStartRequest {
    pub prompt: String,
    #[serde(default)]
    pub max_steps: Option<u32>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRunView {
    pub job_id: String,
    pub status: String,
    pub prompt: String,
    pub started_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    pub root_issue_id: Option<String>,
    pub max_steps: u32,
    pub mode: String,
    pub source: String,
    pub exit_code: Option<i32>,
    pub last_progress: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunsListResponse {
    pub runs: Vec<QueuedRunView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatView {
    pub program_id: String,
    pub title: String,
    pub enabled: bool,
    pub every_ms: u64,
    pub next_trigger_at_ms: u64,
    pub last_triggered_at_ms: Option<u64>,
    pub last_result: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatsListResponse {
    pub heartbeats: Vec<HeartbeatView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatCreateRequest {
    pub title: String,
    pub every_ms: u64,
    #[serde(default)]
    pub target_job_id: Option<String>,
    #[serde(default)]
    pub target_root_issue_id: Option<String>,
    #[serde(default)]
    pub wake_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatUpdateRequest {
    pub program_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub every_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatDeleteRequest {
    pub program_id: String,
}

/// Wire form of a cron schedule. Mirrors the scheduler's `Schedule` without
/// depending on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleRequest {
    Every { every_ms: u64 },
    At { at_ms: u64 },
    Cron { expr: String, tz: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronCreateRequest {
    pub title: String,
    pub prompt: String,
    pub schedule: ScheduleRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronUpdateRequest {
    pub program_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub schedule: Option<ScheduleRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronDeleteRequest {
    pub program_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronView {
    pub program_id: String,
    pub title: String,
    pub enabled: bool,
    pub next_run_at_ms: u64,
    pub last_triggered_at_ms: Option<u64>,
    pub last_result: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronArmedEntry {
    pub program_id: String,
    pub due_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronStatusView {
    pub count: usize,
    pub enabled_count: usize,
    pub armed_count: usize,
    pub armed: Vec<CronArmedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronListResponse {
    pub cron: Vec<CronView>,
    pub status: CronStatusView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub reloaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub ok: bool,
}

/// Generic acknowledgement for endpoints with nothing else to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub ok: bool,
    pub pid: u32,
    pub uptime_ms: u64,
}

/// The uniform error body every non-2xx control-plane response carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
