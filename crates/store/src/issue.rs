// SPDX-License-Identifier: MIT

//! Issue type: a node in the work DAG.

use foreman_core::IssueId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default priority for a newly created issue.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Well-known tags shared across issue roles.
pub mod well_known_tags {
    pub const NODE_ROOT: &str = "node:root";
    pub const NODE_AGENT: &str = "node:agent";
    pub const ROLE_ORCHESTRATOR: &str = "role:orchestrator";
    pub const ROLE_WORKER: &str = "role:worker";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Closed,
}

foreman_core::simple_display! {
    Status {
        Open => "open",
        InProgress => "in_progress",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    NeedsWork,
    Expanded,
    Skipped,
}

foreman_core::simple_display! {
    Outcome {
        Success => "success",
        Failure => "failure",
        NeedsWork => "needs_work",
        Expanded => "expanded",
        Skipped => "skipped",
    }
}

impl Outcome {
    /// Outcomes `validate()` accepts as terminal-final.
    pub fn is_final_outcome(self) -> bool {
        matches!(self, Outcome::Success | Outcome::Skipped | Outcome::Expanded)
    }
}

/// The relation an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    Blocks,
    Parent,
}

/// A node in the work DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub body: String,
    pub status: Status,
    pub outcome: Option<Outcome>,
    pub priority: u8,
    pub tags: BTreeSet<String>,
    /// Issues this issue blocks (outgoing `blocks` edges; this issue is `src`).
    pub blocks: BTreeSet<IssueId>,
    /// This issue's parent, if any (the tree edge; this issue is the child).
    pub parent: Option<IssueId>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Issue {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_tags(&self, required: &[String]) -> bool {
        required.iter().all(|t| self.has_tag(t))
    }

    pub fn matches_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.body.to_lowercase().contains(&needle)
    }
}

/// Fields that may be patched by `update`.
///
/// `outcome` is `Option<Option<Outcome>>`: `None` leaves the field
/// untouched, `Some(None)` clears it, `Some(Some(o))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Option<Outcome>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
}

/// Parameters accepted by `create`.
#[derive(Debug, Clone, Default)]
pub struct CreateIssueInput {
    pub body: String,
    pub tags: BTreeSet<String>,
    pub priority: Option<u8>,
}

/// One line of the issue append log, discriminated by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IssueLogRecord {
    Create {
        id: IssueId,
        title: String,
        body: String,
        tags: BTreeSet<String>,
        priority: u8,
        ts_ms: u64,
    },
    Update {
        id: IssueId,
        patch: IssuePatch,
        ts_ms: u64,
    },
    AddDep {
        src: IssueId,
        dep_type: DepType,
        dst: IssueId,
        ts_ms: u64,
    },
    RemoveDep {
        src: IssueId,
        dep_type: DepType,
        dst: IssueId,
        ts_ms: u64,
    },
    Claim {
        id: IssueId,
        ts_ms: u64,
    },
    Close {
        id: IssueId,
        outcome: Outcome,
        ts_ms: u64,
    },
}

impl IssueLogRecord {
    pub fn issue_id(&self) -> IssueId {
        match self {
            IssueLogRecord::Create { id, .. }
            | IssueLogRecord::Update { id, .. }
            | IssueLogRecord::Claim { id, .. }
            | IssueLogRecord::Close { id, .. } => *id,
            IssueLogRecord::AddDep { src, .. } | IssueLogRecord::RemoveDep { src, .. } => *src,
        }
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
