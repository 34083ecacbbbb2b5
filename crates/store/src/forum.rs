// SPDX-License-Identifier: MIT

//! Forum message: an append-only coordination record.

use serde::{Deserialize, Serialize};

/// A single append-only forum message. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: u64,
}

/// A grouped summary of one topic's thread, as returned by `topics()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    pub messages: usize,
    pub last_at: u64,
}

#[cfg(test)]
#[path = "forum_tests.rs"]
mod tests;
