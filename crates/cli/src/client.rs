// SPDX-License-Identifier: MIT

//! HTTP client for the background server's control plane, plus the
//! discover-or-spawn logic `run`/`heartbeats`/`cron`/`serve` use to find a
//! live server before talking to it.

use foreman_core::ErrorKind;
use foreman_store::StorePaths;
use foreman_wire::{
    CronCreateRequest, CronDeleteRequest, CronListResponse, CronUpdateRequest, CronView, DiscoveryRecord, ErrorEnvelope,
    HealthzResponse, HeartbeatCreateRequest, HeartbeatDeleteRequest, HeartbeatUpdateRequest, HeartbeatView,
    HeartbeatsListResponse, OkResponse, QueuedRunView, ReloadResponse, RunStartRequest, RunsListResponse,
};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::CliError;

fn request_err(kind: ErrorKind, detail: impl std::fmt::Display) -> CliError {
    CliError::new(kind, detail.to_string())
}

pub struct ControlClient {
    base_url: String,
    http: reqwest::Client,
}

impl ControlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let response = self.http.get(format!("{}{path}", self.base_url)).send().await.map_err(|e| {
            request_err(ErrorKind::ServerUnreachable, format!("could not reach the foreman server: {e}"))
        })?;
        Self::decode(response).await
    }

    async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, CliError> {
        let response = self.http.post(format!("{}{path}", self.base_url)).json(body).send().await.map_err(|e| {
            request_err(ErrorKind::ServerUnreachable, format!("could not reach the foreman server: {e}"))
        })?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, CliError> {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(|e| request_err(ErrorKind::RequestRejected, format!("malformed server response: {e}")))
        } else if status.as_u16() == 504 {
            Err(request_err(ErrorKind::RequestTimeout, "the foreman server timed out handling this request"))
        } else {
            let envelope: ErrorEnvelope =
                response.json().await.unwrap_or_else(|_| ErrorEnvelope::new("the foreman server returned an error"));
            Err(request_err(ErrorKind::RequestRejected, envelope.error))
        }
    }

    pub async fn healthz(&self) -> Result<HealthzResponse, CliError> {
        self.get("/healthz").await
    }

    pub async fn start_run(&self, req: RunStartRequest) -> Result<QueuedRunView, CliError> {
        self.post("/api/control-plane/runs/start", &req).await
    }

    pub async fn reload(&self) -> Result<ReloadResponse, CliError> {
        self.post("/api/control-plane/reload", &serde_json::json!({})).await
    }

    pub async fn list_runs(&self) -> Result<RunsListResponse, CliError> {
        self.get("/api/runs").await
    }

    pub async fn list_heartbeats(&self) -> Result<HeartbeatsListResponse, CliError> {
        self.get("/api/heartbeats").await
    }

    pub async fn get_heartbeat(&self, program_id: &str) -> Result<HeartbeatView, CliError> {
        self.get(&format!("/api/heartbeats/{program_id}")).await
    }

    pub async fn create_heartbeat(&self, req: HeartbeatCreateRequest) -> Result<HeartbeatView, CliError> {
        self.post("/api/heartbeats/create", &req).await
    }

    pub async fn update_heartbeat(&self, req: HeartbeatUpdateRequest) -> Result<HeartbeatView, CliError> {
        self.post("/api/heartbeats/update", &req).await
    }

    pub async fn delete_heartbeat(&self, req: HeartbeatDeleteRequest) -> Result<OkResponse, CliError> {
        self.post("/api/heartbeats/delete", &req).await
    }

    pub async fn list_cron(&self) -> Result<CronListResponse, CliError> {
        self.get("/api/cron").await
    }

    pub async fn create_cron(&self, req: CronCreateRequest) -> Result<CronView, CliError> {
        self.post("/api/cron/create", &req).await
    }

    pub async fn update_cron(&self, req: CronUpdateRequest) -> Result<CronView, CliError> {
        self.post("/api/cron/update", &req).await
    }

    pub async fn delete_cron(&self, req: CronDeleteRequest) -> Result<OkResponse, CliError> {
        self.post("/api/cron/delete", &req).await
    }

    pub async fn shutdown(&self) -> Result<(), CliError> {
        let _: serde_json::Value = self.post("/api/server/shutdown", &serde_json::json!({})).await?;
        Ok(())
    }
}

/// Discover a live server, honoring `FOREMAN_SERVER_URL` first.
pub fn discover(paths: &StorePaths) -> Result<Option<DiscoveryRecord>, CliError> {
    if let Some(url) = crate::env::server_url_override() {
        return Ok(Some(DiscoveryRecord::new(0, 0, url)));
    }
    foreman_serve::probe::discover_live(paths.server_discovery_file())
        .map_err(|e| request_err(e.kind(), format!("failed reading server discovery record: {e}")))
}

/// Connect to a live server, or fall back to spawning one detached in the
/// background and polling `/healthz` until it answers.
pub async fn discover_or_spawn(paths: &StorePaths, repo_root: &std::path::Path) -> Result<ControlClient, CliError> {
    if let Some(record) = discover(paths)? {
        return Ok(ControlClient::new(record.url));
    }

    let binary = find_serve_binary();
    Command::new(&binary)
        .arg("--repo-root")
        .arg(repo_root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| request_err(ErrorKind::ServerUnreachable, format!("failed to start {}: {e}", binary.display())))?;

    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Some(record) = discover(paths)? {
            let client = ControlClient::new(record.url);
            if client.healthz().await.is_ok() {
                return Ok(client);
            }
        }
    }
    Err(request_err(ErrorKind::ServerUnreachable, "foreman server did not come up in time"))
}

/// Locate the sibling `foreman-serve` binary: a debug build next to this
/// one, this executable's own directory, or finally a bare PATH lookup.
fn find_serve_binary() -> PathBuf {
    let current_exe = std::env::current_exe().ok();

    let is_debug_build =
        current_exe.as_ref().and_then(|p| p.to_str()).map(|s| s.contains("target/debug")).unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = option_env!("CARGO_MANIFEST_DIR") {
            if let Some(dev_path) = PathBuf::from(manifest_dir).parent().and_then(|p| p.parent()).map(|p| p.join("target/debug/foreman-serve")) {
                if dev_path.exists() {
                    return dev_path;
                }
            }
        }
    }

    if let Some(dir) = current_exe.as_ref().and_then(|exe| exe.parent()) {
        let sibling = dir.join("foreman-serve");
        if sibling.exists() {
            return sibling;
        }
    }

    PathBuf::from("foreman-serve")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
