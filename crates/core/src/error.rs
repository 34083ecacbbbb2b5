// SPDX-License-Identifier: MIT

//! The shared error-kind vocabulary.
//!
//! Each component crate defines its own `thiserror` enum for its own
//! failure modes, but every one of those enums exposes a `kind()` accessor
//! returning one of these variants so the CLI's output layer and the HTTP
//! control plane can render a stable `{ error: string }` envelope and a
//! stable exit code regardless of which component failed.

use serde::{Deserialize, Serialize};

/// The closed set of error kinds a caller across the workspace may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Ambiguous,
    StorageIo,
    OperatorDisabled,
    OperatorActionDisallowed,
    OperatorInvalidOutput,
    ContextMissing,
    ContextAmbiguous,
    ContextUnauthorized,
    CliValidationFailed,
    ServerUnreachable,
    RequestTimeout,
    RequestRejected,
    BackendError,
    BackendTimeout,
}

crate::simple_display! {
    ErrorKind {
        InvalidInput => "invalid_input",
        NotFound => "not_found",
        Ambiguous => "ambiguous",
        StorageIo => "storage_io",
        OperatorDisabled => "operator_disabled",
        OperatorActionDisallowed => "operator_action_disallowed",
        OperatorInvalidOutput => "operator_invalid_output",
        ContextMissing => "context_missing",
        ContextAmbiguous => "context_ambiguous",
        ContextUnauthorized => "context_unauthorized",
        CliValidationFailed => "cli_validation_failed",
        ServerUnreachable => "server_unreachable",
        RequestTimeout => "request_timeout",
        RequestRejected => "request_rejected",
        BackendError => "backend_error",
        BackendTimeout => "backend_timeout",
    }
}

impl ErrorKind {
    /// Process exit code a CLI invocation should use for this kind.
    pub fn exit_code(self) -> i32 {
        1
    }
}

/// A one-line recovery hint surfaced to a TTY as `Try: <hint> | <hint>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryHint {
    pub hints: Vec<String>,
}

impl RecoveryHint {
    pub fn new(hints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { hints: hints.into_iter().map(Into::into).collect() }
    }

    pub fn single(hint: impl Into<String>) -> Self {
        Self { hints: vec![hint.into()] }
    }
}

impl std::fmt::Display for RecoveryHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Try: {}", self.hints.join(" | "))
    }
}

/// Backend-crash recovery hint triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRecoveryHint {
    pub replay: String,
    pub logs: String,
    pub resume: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
