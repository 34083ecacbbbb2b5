// SPDX-License-Identifier: MIT

//! Errors surfaced by the serve lifecycle and its HTTP control plane.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use foreman_core::ErrorKind;
use foreman_scheduler::SchedulerError;
use foreman_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("server unreachable: {0}")]
    ServerUnreachable(String),

    #[error("request timed out")]
    RequestTimeout,

    #[error("request rejected: {0}")]
    RequestRejected(String),

    #[error("could not acquire the workspace writer lock; another server is running")]
    LockFailed,
}

impl ServeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServeError::Store(e) => e.kind(),
            ServeError::Scheduler(e) => e.kind(),
            ServeError::Io(_) | ServeError::LockFailed | ServeError::Config(_) => ErrorKind::StorageIo,
            ServeError::ServerUnreachable(_) => ErrorKind::ServerUnreachable,
            ServeError::RequestTimeout => ErrorKind::RequestTimeout,
            ServeError::RequestRejected(_) => ErrorKind::RequestRejected,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput | ErrorKind::Ambiguous | ErrorKind::CliValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::RequestTimeout | ErrorKind::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::RequestRejected | ErrorKind::OperatorActionDisallowed | ErrorKind::OperatorDisabled => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every non-2xx response carries `{ error: string }`, per the control
/// plane's uniform error envelope.
impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(foreman_wire::ErrorEnvelope::new(self.to_string()));
        (status, body).into_response()
    }
}

pub type ServeResult<T> = Result<T, ServeError>;
