// SPDX-License-Identifier: MIT

//! Cross-cutting event journal record.
//!
//! The event log is the canonical history of everything that happened in
//! a workspace. The issue and forum logs are kept as their own independent
//! append logs rather than derived from this one.

use foreman_core::{IssueId, RunId};
use serde::{Deserialize, Serialize};

/// A record in the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub ts_ms: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<IssueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl EventRecord {
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, ts_ms: u64) -> Self {
        Self {
            ts_ms,
            event_type: event_type.into(),
            source: source.into(),
            issue_id: None,
            run_id: None,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_issue(mut self, id: IssueId) -> Self {
        self.issue_id = Some(id);
        self
    }

    pub fn with_run(mut self, id: RunId) -> Self {
        self.run_id = Some(id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Filter for `EventLog::query`.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub event_type: Option<String>,
    pub source: Option<String>,
    pub issue_id: Option<IssueId>,
    pub run_id: Option<RunId>,
    pub contains: Option<String>,
    pub since_ms: Option<u64>,
    pub limit: Option<usize>,
}

impl EventQuery {
    fn matches(&self, event: &EventRecord) -> bool {
        if let Some(t) = &self.event_type {
            if &event.event_type != t {
                return false;
            }
        }
        if let Some(s) = &self.source {
            if &event.source != s {
                return false;
            }
        }
        if let Some(id) = &self.issue_id {
            if event.issue_id.as_ref() != Some(id) {
                return false;
            }
        }
        if let Some(id) = &self.run_id {
            if event.run_id.as_ref() != Some(id) {
                return false;
            }
        }
        if let Some(since) = self.since_ms {
            if event.ts_ms < since {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            let needle = needle.to_lowercase();
            let haystack = format!("{} {}", event.event_type, event.payload);
            if !haystack.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Apply the filter, keeping insertion order, then keep only the last
    /// `limit` matches if one was requested.
    pub fn apply<'a>(&self, events: impl Iterator<Item = &'a EventRecord>) -> Vec<&'a EventRecord> {
        let mut matched: Vec<&EventRecord> = events.filter(|e| self.matches(e)).collect();
        if let Some(limit) = self.limit {
            if matched.len() > limit {
                matched = matched.split_off(matched.len() - limit);
            }
        }
        matched
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
