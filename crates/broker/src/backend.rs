// SPDX-License-Identifier: MIT

//! The operator-agent backend boundary. The broker drives whatever
//! implements [`OperatorBackend`] one turn at a time; this crate ships
//! only [`MockOperatorBackend`], a deterministic stand-in for tests.

use crate::command::ApprovedCommand;
use crate::envelope::InboundEnvelope;
use crate::error::BrokerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// What the operator backend decided to do with one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnResult {
    /// Free-form text to relay back to the operator, verbatim.
    Respond { message: String },
    /// A proposed action, still subject to the broker's own gating and
    /// context resolution before it is ever executed.
    Command { proposal: ApprovedCommand },
}

/// Drives one operator-conversation turn against an external agent.
///
/// The broker assumes nothing about how the backend reasons about the
/// turn; it only relies on the yielded [`TurnResult`].
#[async_trait]
pub trait OperatorBackend: Send + Sync {
    async fn run_turn(&self, envelope: &InboundEnvelope, transcript: &[String]) -> Result<TurnResult, BrokerError>;
}

/// Deterministic backend for tests: returns pre-scripted turn results in
/// order, falling back to a generic respond once the script is exhausted.
#[derive(Default)]
pub struct MockOperatorBackend {
    script: Mutex<VecDeque<TurnResult>>,
}

impl MockOperatorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: TurnResult) -> &Self {
        self.script.lock().push_back(result);
        self
    }
}

#[async_trait]
impl OperatorBackend for MockOperatorBackend {
    async fn run_turn(&self, _envelope: &InboundEnvelope, _transcript: &[String]) -> Result<TurnResult, BrokerError> {
        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or(TurnResult::Respond { message: "ok".to_string() }))
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
