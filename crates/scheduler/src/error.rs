// SPDX-License-Identifier: MIT

//! Errors surfaced by the scheduled-run controller.

use foreman_core::ErrorKind;
use foreman_runner::RunnerError;
use foreman_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid cron expression {expr:?}: {detail}")]
    InvalidCronExpr { expr: String, detail: String },
}

impl SchedulerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::Store(e) => e.kind(),
            SchedulerError::Runner(e) => e.kind(),
            SchedulerError::InvalidInput(_) | SchedulerError::InvalidCronExpr { .. } => ErrorKind::InvalidInput,
            SchedulerError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
