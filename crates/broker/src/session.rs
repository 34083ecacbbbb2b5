// SPDX-License-Identifier: MIT

//! Operator sessions and the conversation-key registry that owns them.
//!
//! A session is disposed when idle beyond a TTL or evicted on overflow of
//! the registry's maximum session count (least-recently-used first).

use foreman_core::OperatorSessionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// `(channel, tenant_id, conversation_id, binding_id)` — the unit a session
/// is scoped to. One session per key; never shared across keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub channel: String,
    pub tenant_id: String,
    pub conversation_id: String,
    pub binding_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSession {
    pub operator_session_id: OperatorSessionId,
    pub repo_root: String,
    pub created_at_ms: u64,
    pub last_used_at_ms: u64,
    pub transcript_file: Option<String>,
    pub message_count: u32,
}

impl OperatorSession {
    pub fn new(repo_root: String, ts_ms: u64) -> Self {
        Self {
            operator_session_id: OperatorSessionId::new(),
            repo_root,
            created_at_ms: ts_ms,
            last_used_at_ms: ts_ms,
            transcript_file: None,
            message_count: 0,
        }
    }
}

struct Entry {
    session: OperatorSession,
    last_touched: Instant,
}

/// A bounded, TTL-evicting map from conversation key to operator session.
pub struct SessionRegistry {
    sessions: HashMap<ConversationKey, Entry>,
    max_sessions: usize,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self { sessions: HashMap::new(), max_sessions, ttl }
    }

    /// Drop any session idle past its TTL. Call before `get_or_create` so a
    /// stale entry never blocks a fresh one from being created.
    pub fn sweep_expired(&mut self, now: Instant) {
        self.sessions.retain(|_, entry| now.saturating_duration_since(entry.last_touched) < self.ttl);
    }

    pub fn get_or_create(&mut self, key: ConversationKey, repo_root: &str, ts_ms: u64, now: Instant) -> OperatorSession {
        self.sweep_expired(now);

        if let Some(entry) = self.sessions.get_mut(&key) {
            entry.last_touched = now;
            entry.session.last_used_at_ms = ts_ms;
            return entry.session.clone();
        }

        if self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }

        let session = OperatorSession::new(repo_root.to_string(), ts_ms);
        self.sessions.insert(key, Entry { session: session.clone(), last_touched: now });
        session
    }

    /// Record that one more turn was processed on `key`'s session.
    pub fn record_turn(&mut self, key: &ConversationKey, ts_ms: u64) {
        if let Some(entry) = self.sessions.get_mut(key) {
            entry.session.message_count += 1;
            entry.session.last_used_at_ms = ts_ms;
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(key) = self.sessions.iter().min_by_key(|(_, e)| e.last_touched).map(|(k, _)| k.clone()) {
            self.sessions.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
