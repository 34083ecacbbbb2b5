// SPDX-License-Identifier: MIT

//! The HTTP control plane: a thin `axum` `Router` over the scheduler and
//! the workspace store. No business logic lives here — every handler
//! validates the request shape, calls into `foreman-scheduler`/
//! `foreman-store`, and maps the result onto `foreman-wire`'s DTOs.

use crate::config::RunDefaults;
use crate::error::ServeError;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use foreman_core::Clock;
use foreman_scheduler::{
    CronPatch, CronProgram, CronStatus, HeartbeatPatch, HeartbeatProgram, RunSource, Schedule, SchedulerController,
    Target, WakeMode,
};
use foreman_wire::{
    CronArmedEntry, CronCreateRequest, CronDeleteRequest, CronListResponse, CronStatusView, CronUpdateRequest,
    CronView, HealthzResponse, HeartbeatCreateRequest, HeartbeatDeleteRequest, HeartbeatUpdateRequest, HeartbeatView,
    HeartbeatsListResponse, OkResponse, QueuedRunView, ReloadResponse, RunStartRequest, RunsListResponse,
    ScheduleRequest, ShutdownResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub struct AppState<C: Clock> {
    pub scheduler: Arc<SchedulerController<C>>,
    pub run_defaults: RunDefaults,
    pub started_at: Instant,
    pub shutdown: Arc<Notify>,
}

/// Build the control-plane router. `timeout` bounds every request; a
/// request that outlives it fails with a `504` carrying `{ error }`,
/// matching the control plane's uniform error envelope.
pub fn router<C: Clock + 'static>(state: Arc<AppState<C>>, timeout: std::time::Duration) -> Router {
    Router::new()
        .route("/api/control-plane/runs/start", post(start_run::<C>))
        .route("/api/control-plane/reload", post(reload::<C>))
        .route("/api/runs", get(list_runs::<C>))
        .route("/api/heartbeats", get(list_heartbeats::<C>))
        .route("/api/heartbeats/create", post(create_heartbeat::<C>))
        .route("/api/heartbeats/update", post(update_heartbeat::<C>))
        .route("/api/heartbeats/delete", post(delete_heartbeat::<C>))
        .route("/api/heartbeats/:program_id", get(get_heartbeat::<C>))
        .route("/api/cron", get(list_cron::<C>))
        .route("/api/cron/create", post(create_cron::<C>))
        .route("/api/cron/update", post(update_cron::<C>))
        .route("/api/cron/delete", post(delete_cron::<C>))
        .route("/api/server/shutdown", post(shutdown::<C>))
        .route("/healthz", get(healthz::<C>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(tower::timeout::TimeoutLayer::new(timeout)))
        .with_state(state)
}

fn queued_run_view(run: foreman_scheduler::QueuedRun) -> QueuedRunView {
    QueuedRunView {
        job_id: run.job_id.to_string(),
        status: run.status.to_string(),
        prompt: run.prompt,
        started_at_ms: run.started_at_ms,
        finished_at_ms: run.finished_at_ms,
        root_issue_id: run.root_issue_id.map(|id| id.to_string()),
        max_steps: run.max_steps,
        mode: run.mode,
        source: run.source.to_string(),
        exit_code: run.exit_code,
        last_progress: run.last_progress,
    }
}

fn heartbeat_view(program: HeartbeatProgram) -> HeartbeatView {
    HeartbeatView {
        program_id: program.program_id.to_string(),
        title: program.title,
        enabled: program.enabled,
        every_ms: program.every_ms,
        next_trigger_at_ms: program.next_trigger_at_ms,
        last_triggered_at_ms: program.last_triggered_at_ms,
        last_result: program.last_result,
        reason: program.reason,
    }
}

fn cron_view(program: CronProgram) -> CronView {
    CronView {
        program_id: program.program_id.to_string(),
        title: program.title,
        enabled: program.enabled,
        next_run_at_ms: program.next_run_at_ms,
        last_triggered_at_ms: program.last_triggered_at_ms,
        last_result: program.last_result,
        reason: program.reason,
    }
}

fn cron_status_view(status: CronStatus) -> CronStatusView {
    CronStatusView {
        count: status.count,
        enabled_count: status.enabled_count,
        armed_count: status.armed_count,
        armed: status.armed.into_iter().map(|(program_id, due_at_ms)| CronArmedEntry { program_id: program_id.to_string(), due_at_ms }).collect(),
    }
}

async fn start_run<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<RunStartRequest>,
) -> Result<impl IntoResponse, ServeError> {
    if body.prompt.trim().is_empty() {
        return Err(ServeError::RequestRejected("prompt must not be empty".to_string()));
    }
    let max_steps = body.max_steps.unwrap_or(state.run_defaults.max_steps);
    let mode = body.provider.unwrap_or_else(|| state.run_defaults.provider.clone());
    let run = state.scheduler.enqueue_run(body.prompt, max_steps, mode, RunSource::Cli)?;
    Ok(Json(queued_run_view(run)))
}

async fn reload<C: Clock>(State(_state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    Json(ReloadResponse { reloaded: true })
}

async fn list_runs<C: Clock>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    let runs = state.scheduler.list_runs().into_iter().map(queued_run_view).collect();
    Json(RunsListResponse { runs })
}

async fn list_heartbeats<C: Clock>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    let heartbeats = state.scheduler.list_heartbeats().into_iter().map(heartbeat_view).collect();
    Json(HeartbeatsListResponse { heartbeats })
}

async fn create_heartbeat<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<HeartbeatCreateRequest>,
) -> Result<impl IntoResponse, ServeError> {
    let target = Target::Run {
        job_id: body.target_job_id.map(|s| s.as_str().into()),
        root_issue_id: body.target_root_issue_id.map(|s| s.as_str().into()),
    };
    let wake_mode = match body.wake_mode.as_deref() {
        Some("reenqueue") => WakeMode::Reenqueue,
        _ => WakeMode::Nudge,
    };
    let program = state.scheduler.create_heartbeat(body.title, target, body.every_ms, wake_mode)?;
    Ok(Json(heartbeat_view(program)))
}

async fn update_heartbeat<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<HeartbeatUpdateRequest>,
) -> Result<impl IntoResponse, ServeError> {
    let patch = HeartbeatPatch { title: body.title, enabled: body.enabled, every_ms: body.every_ms };
    let program = state.scheduler.update_heartbeat(&body.program_id, patch)?;
    Ok(Json(heartbeat_view(program)))
}

async fn delete_heartbeat<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<HeartbeatDeleteRequest>,
) -> Result<impl IntoResponse, ServeError> {
    state.scheduler.delete_heartbeat(&body.program_id)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn get_heartbeat<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(program_id): Path<String>,
) -> Result<impl IntoResponse, ServeError> {
    let program = state.scheduler.get_heartbeat(&program_id)?;
    Ok(Json(heartbeat_view(program)))
}

fn schedule_from_wire(wire: ScheduleRequest) -> Schedule {
    match wire {
        ScheduleRequest::Every { every_ms } => Schedule::Every { every_ms },
        ScheduleRequest::At { at_ms } => Schedule::At { at_ms },
        ScheduleRequest::Cron { expr, tz } => Schedule::Cron { expr, tz },
    }
}

async fn create_cron<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<CronCreateRequest>,
) -> Result<impl IntoResponse, ServeError> {
    let program = state.scheduler.create_cron(body.title, body.prompt, schedule_from_wire(body.schedule))?;
    Ok(Json(cron_view(program)))
}

async fn update_cron<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<CronUpdateRequest>,
) -> Result<impl IntoResponse, ServeError> {
    let patch = CronPatch {
        title: body.title,
        prompt: body.prompt,
        enabled: body.enabled,
        schedule: body.schedule.map(schedule_from_wire),
    };
    let program = state.scheduler.update_cron(&body.program_id, patch)?;
    Ok(Json(cron_view(program)))
}

async fn delete_cron<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<CronDeleteRequest>,
) -> Result<impl IntoResponse, ServeError> {
    state.scheduler.delete_cron(&body.program_id)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn list_cron<C: Clock>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    let cron = state.scheduler.list_cron().into_iter().map(cron_view).collect();
    let status = cron_status_view(state.scheduler.cron_status());
    Json(CronListResponse { cron, status })
}

async fn shutdown<C: Clock>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    // `notify_waiters`, not `notify_one`: both the axum graceful-shutdown
    // future and the tick loop are waiting on this and must both wake.
    state.shutdown.notify_waiters();
    Json(ShutdownResponse { ok: true })
}

async fn healthz<C: Clock>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    Json(HealthzResponse { ok: true, pid: std::process::id(), uptime_ms: state.started_at.elapsed().as_millis() as u64 })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
