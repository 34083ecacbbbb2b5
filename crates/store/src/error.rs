// SPDX-License-Identifier: MIT

//! Error type for the workspace state store.

use foreman_core::ErrorKind;
use thiserror::Error;

/// Errors surfaced by [`crate::store::WorkspaceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous id prefix {prefix:?}: matches {matches:?}")]
    Ambiguous { prefix: String, matches: Vec<String> },

    #[error("storage io error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("corrupt log record in {path}: {detail}")]
    CorruptLog { path: String, detail: String },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Ambiguous { .. } => ErrorKind::Ambiguous,
            StoreError::StorageIo(_) | StoreError::CorruptLog { .. } => ErrorKind::StorageIo,
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        StoreError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
