// SPDX-License-Identifier: MIT

//! Custom error type that carries a process exit code and a recovery hint.
//!
//! Commands return `CliError` instead of calling `std::process::exit()`
//! directly, so `main()` is the only place that terminates the process.

use foreman_core::ErrorKind;
use std::fmt;

#[derive(Debug)]
pub struct CliError {
    pub kind: ErrorKind,
    pub message: String,
    pub hints: Vec<String>,
}

impl CliError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), hints: Vec::new() }
    }

    pub fn with_hints(mut self, hints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<foreman_store::StoreError> for CliError {
    fn from(err: foreman_store::StoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<foreman_scheduler::SchedulerError> for CliError {
    fn from(err: foreman_scheduler::SchedulerError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<foreman_runner::RunnerError> for CliError {
    fn from(err: foreman_runner::RunnerError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<foreman_broker::BrokerError> for CliError {
    fn from(err: foreman_broker::BrokerError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<foreman_serve::error::ServeError> for CliError {
    fn from(err: foreman_serve::error::ServeError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Catch-all for output formatting failures (e.g. JSON serialization),
/// which indicate a malformed request rather than a storage or server fault.
impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(ErrorKind::CliValidationFailed, err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
