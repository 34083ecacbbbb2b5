// SPDX-License-Identifier: MIT

//! Errors surfaced by the DAG runner.

use foreman_core::ErrorKind;
use foreman_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("backend failed: {0}")]
    BackendError(String),

    #[error("backend timed out after {0:?}")]
    BackendTimeout(std::time::Duration),
}

impl RunnerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunnerError::Store(e) => e.kind(),
            RunnerError::BackendError(_) => ErrorKind::BackendError,
            RunnerError::BackendTimeout(_) => ErrorKind::BackendTimeout,
        }
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Carried on every backend failure so the caller can offer a recovery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRecoveryHint {
    pub replay: String,
    pub logs: String,
    pub resume: String,
}

impl BackendRecoveryHint {
    pub fn for_issue(root_id: &str, issue_id: &str) -> Self {
        Self {
            replay: format!("fm replay {issue_id}"),
            logs: format!("fm store tail logs/{root_id}/{issue_id}"),
            resume: format!("fm resume {root_id}"),
        }
    }
}
