// SPDX-License-Identifier: MIT

//! Errors surfaced by the operator-message broker.

use foreman_core::ErrorKind;
use foreman_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("operator backend failed: {0}")]
    BackendError(String),

    #[error("operator backend returned an invalid turn payload")]
    InvalidResponsePayload,

    #[error("operator turn timed out")]
    Timeout,
}

impl BrokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::Store(e) => e.kind(),
            BrokerError::BackendError(_) | BrokerError::InvalidResponsePayload => ErrorKind::BackendError,
            BrokerError::Timeout => ErrorKind::BackendTimeout,
        }
    }
}

pub type BrokerResult<T> = Result<T, BrokerError>;
