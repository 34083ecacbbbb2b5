// SPDX-License-Identifier: MIT

//! The workspace state store: append-only issue, forum,
//! and event logs plus their in-memory projections.

use crate::error::{StoreError, StoreResult};
use crate::event::{EventQuery, EventRecord};
use crate::forum::{Message, TopicSummary};
use crate::issue::{CreateIssueInput, DepType, Issue, IssueLogRecord, IssuePatch, Outcome, Status};
use crate::log::AppendLog;
use crate::paths::StorePaths;
use foreman_core::{Clock, IssueId, SystemClock};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;

/// Filter accepted by `list()`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub tag: Option<String>,
}

/// Filter accepted by `ready()`.
#[derive(Debug, Clone, Default)]
pub struct ReadyFilter {
    pub tags: Vec<String>,
    pub contains: Option<String>,
    pub limit: Option<usize>,
}

/// Result of `validate()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateResult {
    pub is_final: bool,
    pub reason: String,
}

#[derive(Default)]
struct Projection {
    issues: HashMap<IssueId, Issue>,
    order: Vec<IssueId>,
    id_index: BTreeMap<String, IssueId>,
    /// Reverse of `Issue::blocks`: dst -> set of issues blocking it.
    blocked_by: HashMap<IssueId, BTreeSet<IssueId>>,
    /// Reverse of `Issue::parent`: parent -> set of direct children.
    children_of: HashMap<IssueId, BTreeSet<IssueId>>,
    forum: Vec<Message>,
    events: Vec<EventRecord>,
}

impl Projection {
    fn apply_issue_record(&mut self, record: &IssueLogRecord) -> StoreResult<()> {
        match record {
            IssueLogRecord::Create { id, title, body, tags, priority, ts_ms } => {
                if self.issues.contains_key(id) {
                    return Err(StoreError::invalid_input(format!("duplicate issue id {id}")));
                }
                let issue = Issue {
                    id: *id,
                    title: title.clone(),
                    body: body.clone(),
                    status: Status::Open,
                    outcome: None,
                    priority: *priority,
                    tags: tags.clone(),
                    blocks: BTreeSet::new(),
                    parent: None,
                    created_at: *ts_ms,
                    updated_at: *ts_ms,
                };
                self.id_index.insert(id.as_str().to_string(), *id);
                self.order.push(*id);
                self.issues.insert(*id, issue);
            }
            IssueLogRecord::Update { id, patch, ts_ms } => {
                let issue = self.issues.get_mut(id).ok_or_else(|| {
                    StoreError::invalid_input(format!("update of unknown issue {id}"))
                })?;
                apply_patch(issue, patch, *ts_ms)?;
            }
            IssueLogRecord::Claim { id, ts_ms } => {
                let issue = self.issues.get_mut(id).ok_or_else(|| {
                    StoreError::invalid_input(format!("claim of unknown issue {id}"))
                })?;
                if issue.status != Status::Open {
                    return Err(StoreError::invalid_input(format!(
                        "cannot claim {id}: status is {}",
                        issue.status
                    )));
                }
                issue.status = Status::InProgress;
                issue.updated_at = (*ts_ms).max(issue.updated_at);
            }
            IssueLogRecord::Close { id, outcome, ts_ms } => {
                let issue = self.issues.get_mut(id).ok_or_else(|| {
                    StoreError::invalid_input(format!("close of unknown issue {id}"))
                })?;
                issue.status = Status::Closed;
                issue.outcome = Some(*outcome);
                issue.updated_at = (*ts_ms).max(issue.updated_at);
            }
            IssueLogRecord::AddDep { src, dep_type, dst, ts_ms } => {
                self.apply_add_dep(*src, *dep_type, *dst, *ts_ms)?;
            }
            IssueLogRecord::RemoveDep { src, dep_type, dst, ts_ms } => {
                self.apply_remove_dep(*src, *dep_type, *dst, *ts_ms);
            }
        }
        Ok(())
    }

    fn apply_add_dep(
        &mut self,
        src: IssueId,
        dep_type: DepType,
        dst: IssueId,
        ts_ms: u64,
    ) -> StoreResult<()> {
        if src == dst {
            return Err(StoreError::invalid_input("self-edge is not allowed"));
        }
        if !self.issues.contains_key(&src) {
            return Err(StoreError::not_found(format!("{src}")));
        }
        if !self.issues.contains_key(&dst) {
            return Err(StoreError::not_found(format!("{dst}")));
        }
        match dep_type {
            DepType::Blocks => {
                if self.issues[&src].blocks.contains(&dst) {
                    return Ok(()); // idempotent
                }
                if self.blocks_reachable(dst, src) {
                    return Err(StoreError::invalid_input("add_dep would create a blocks cycle"));
                }
                self.issues.get_mut(&src).unwrap().blocks.insert(dst);
                self.issues.get_mut(&src).unwrap().updated_at = ts_ms;
                self.blocked_by.entry(dst).or_default().insert(src);
            }
            DepType::Parent => {
                if self.issues[&src].parent == Some(dst) {
                    return Ok(()); // idempotent
                }
                if let Some(existing) = self.issues[&src].parent {
                    return Err(StoreError::invalid_input(format!(
                        "{src} already has parent {existing}"
                    )));
                }
                if self.is_ancestor(dst, src) {
                    return Err(StoreError::invalid_input("add_dep would create a parent cycle"));
                }
                self.issues.get_mut(&src).unwrap().parent = Some(dst);
                self.issues.get_mut(&src).unwrap().updated_at = ts_ms;
                self.children_of.entry(dst).or_default().insert(src);
            }
        }
        Ok(())
    }

    fn apply_remove_dep(&mut self, src: IssueId, dep_type: DepType, dst: IssueId, ts_ms: u64) -> bool {
        match dep_type {
            DepType::Blocks => {
                let Some(issue) = self.issues.get_mut(&src) else { return false };
                if !issue.blocks.remove(&dst) {
                    return false;
                }
                issue.updated_at = ts_ms;
                if let Some(set) = self.blocked_by.get_mut(&dst) {
                    set.remove(&src);
                }
                true
            }
            DepType::Parent => {
                let Some(issue) = self.issues.get_mut(&src) else { return false };
                if issue.parent != Some(dst) {
                    return false;
                }
                issue.parent = None;
                issue.updated_at = ts_ms;
                if let Some(set) = self.children_of.get_mut(&dst) {
                    set.remove(&src);
                }
                true
            }
        }
    }

    /// True if `from` can reach `to` by following outgoing `blocks` edges.
    fn blocks_reachable(&self, from: IssueId, to: IssueId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(cur) = stack.pop() {
            if cur == to {
                return true;
            }
            if !seen.insert(cur) {
                continue;
            }
            if let Some(issue) = self.issues.get(&cur) {
                stack.extend(issue.blocks.iter().copied());
            }
        }
        false
    }

    /// True if `candidate` is an ancestor of `node` (walking `parent` pointers up from `node`).
    fn is_ancestor(&self, candidate: IssueId, node: IssueId) -> bool {
        let mut cur = node;
        let mut guard = 0;
        while let Some(issue) = self.issues.get(&cur) {
            guard += 1;
            if guard > self.issues.len() + 1 {
                return false; // defensive: should be unreachable given invariants
            }
            match issue.parent {
                Some(p) if p == candidate => return true,
                Some(p) => cur = p,
                None => return false,
            }
        }
        false
    }

    fn subtree_ids(&self, root: IssueId) -> BTreeSet<IssueId> {
        let mut out = BTreeSet::new();
        out.insert(root);
        let mut stack = vec![root];
        while let Some(cur) = stack.pop() {
            if let Some(children) = self.children_of.get(&cur) {
                for child in children {
                    if out.insert(*child) {
                        stack.push(*child);
                    }
                }
            }
        }
        out
    }

    fn is_ready(&self, issue: &Issue, filter: &ReadyFilter) -> bool {
        if issue.status != Status::Open {
            return false;
        }
        if let Some(blockers) = self.blocked_by.get(&issue.id) {
            if blockers.iter().any(|b| self.issues.get(b).map(|i| i.status != Status::Closed).unwrap_or(false)) {
                return false;
            }
        }
        if let Some(children) = self.children_of.get(&issue.id) {
            if children.iter().any(|c| self.issues.get(c).map(|i| i.status == Status::Open).unwrap_or(false)) {
                return false;
            }
        }
        if !issue.has_tags(&filter.tags) {
            return false;
        }
        if let Some(needle) = &filter.contains {
            if !issue.matches_contains(needle) {
                return false;
            }
        }
        true
    }
}

fn apply_patch(issue: &mut Issue, patch: &IssuePatch, ts_ms: u64) -> StoreResult<()> {
    if let Some(title) = &patch.title {
        issue.title = title.clone();
    }
    if let Some(body) = &patch.body {
        issue.body = body.clone();
    }
    if let Some(status) = patch.status {
        issue.status = status;
    }
    if let Some(outcome) = patch.outcome {
        issue.outcome = outcome;
    }
    if let Some(priority) = patch.priority {
        if !(1..=5).contains(&priority) {
            return Err(StoreError::invalid_input("priority must be in [1..5]"));
        }
        issue.priority = priority;
    }
    if let Some(tags) = &patch.tags {
        issue.tags = tags.clone();
    }
    issue.updated_at = ts_ms.max(issue.updated_at);
    Ok(())
}

/// The workspace state store.
pub struct WorkspaceStore<C: Clock = SystemClock> {
    paths: StorePaths,
    clock: C,
    issue_log: Mutex<AppendLog>,
    forum_log: Mutex<AppendLog>,
    event_log: Mutex<AppendLog>,
    state: RwLock<Projection>,
}

impl WorkspaceStore<SystemClock> {
    /// Open (or create) the store rooted at `repo_root` using the system clock.
    pub fn open(repo_root: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        Self::open_with_clock(StorePaths::new(repo_root), SystemClock)
    }
}

impl<C: Clock> WorkspaceStore<C> {
    /// Open (or create) the store at `paths` with an injected clock (for tests).
    pub fn open_with_clock(paths: StorePaths, clock: C) -> StoreResult<Self> {
        paths.ensure_gitignore()?;

        let issue_records: Vec<IssueLogRecord> = AppendLog::read_all(paths.issues_log())?;
        let forum_records: Vec<Message> = AppendLog::read_all(paths.forum_log())?;
        let event_records: Vec<EventRecord> = AppendLog::read_all(paths.events_log())?;

        let mut state = Projection::default();
        for record in &issue_records {
            state.apply_issue_record(record)?;
        }
        state.forum = forum_records;
        state.events = event_records;

        Ok(Self {
            issue_log: Mutex::new(AppendLog::open(paths.issues_log())?),
            forum_log: Mutex::new(AppendLog::open(paths.forum_log())?),
            event_log: Mutex::new(AppendLog::open(paths.events_log())?),
            paths,
            clock,
            state: RwLock::new(state),
        })
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    // ---- issues ----

    pub fn create(&self, title: impl Into<String>, input: CreateIssueInput) -> StoreResult<Issue> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::invalid_input("title must not be empty"));
        }
        let priority = input.priority.unwrap_or(crate::issue::DEFAULT_PRIORITY);
        if !(1..=5).contains(&priority) {
            return Err(StoreError::invalid_input("priority must be in [1..5]"));
        }
        let id = IssueId::new();
        let ts_ms = self.clock.epoch_ms();
        let record = IssueLogRecord::Create {
            id,
            title,
            body: input.body,
            tags: input.tags,
            priority,
            ts_ms,
        };
        self.write_issue_record(record)?;
        Ok(self.state.read().issues[&id].clone())
    }

    pub fn get(&self, id_or_prefix: &str) -> StoreResult<Issue> {
        let state = self.state.read();
        if let Ok(id) = id_or_prefix.parse::<IssueId>() {
            if let Some(issue) = state.issues.get(&id) {
                return Ok(issue.clone());
            }
        }
        let resolved = self.resolve_prefix_locked(&state, id_or_prefix)?;
        Ok(state.issues[&resolved].clone())
    }

    /// Resolve an id prefix to a single full [`IssueId`].
    pub fn resolve_prefix(&self, prefix: &str) -> StoreResult<IssueId> {
        let state = self.state.read();
        self.resolve_prefix_locked(&state, prefix)
    }

    fn resolve_prefix_locked(&self, state: &Projection, prefix: &str) -> StoreResult<IssueId> {
        let mut matches: Vec<&String> =
            state.id_index.range(prefix.to_string()..).take_while(|(k, _)| k.starts_with(prefix)).map(|(k, _)| k).collect();
        matches.sort();
        match matches.len() {
            0 => Err(StoreError::not_found(format!("no issue matches prefix {prefix:?}"))),
            1 => Ok(state.id_index[matches[0]]),
            _ => Err(StoreError::Ambiguous {
                prefix: prefix.to_string(),
                matches: matches.into_iter().cloned().collect(),
            }),
        }
    }

    pub fn list(&self, filter: ListFilter) -> Vec<Issue> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.issues.get(id))
            .filter(|issue| filter.status.map(|s| issue.status == s).unwrap_or(true))
            .filter(|issue| filter.tag.as_ref().map(|t| issue.has_tag(t)).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn subtree_ids(&self, root_id: &str) -> StoreResult<BTreeSet<IssueId>> {
        let root = self.get(root_id)?.id;
        Ok(self.state.read().subtree_ids(root))
    }

    pub fn children(&self, id: &str) -> StoreResult<Vec<Issue>> {
        let parent = self.get(id)?.id;
        let state = self.state.read();
        Ok(state
            .children_of
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|c| state.issues.get(c).cloned())
            .collect())
    }

    pub fn ready(&self, root_id: Option<&str>, filter: ReadyFilter) -> StoreResult<Vec<Issue>> {
        let root = root_id.map(|r| self.get(r)).transpose()?.map(|i| i.id);
        let state = self.state.read();
        let scope: Option<BTreeSet<IssueId>> = root.map(|root| state.subtree_ids(root));
        let mut candidates: Vec<&Issue> = state
            .order
            .iter()
            .filter_map(|id| state.issues.get(id))
            .filter(|issue| scope.as_ref().map(|s| s.contains(&issue.id)).unwrap_or(true))
            .filter(|issue| state.is_ready(issue, &filter))
            .collect();
        candidates.sort_by_key(|issue| (issue.priority, issue.created_at));
        let mut out: Vec<Issue> = candidates.into_iter().cloned().collect();
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    pub fn update(&self, id: &str, patch: IssuePatch) -> StoreResult<Issue> {
        if let Some(priority) = patch.priority {
            if !(1..=5).contains(&priority) {
                return Err(StoreError::invalid_input("priority must be in [1..5]"));
            }
        }
        let id = self.get(id)?.id;
        let ts_ms = self.clock.epoch_ms();
        self.write_issue_record(IssueLogRecord::Update { id, patch, ts_ms })?;
        Ok(self.state.read().issues[&id].clone())
    }

    /// The `open` lifecycle verb: resets closed/in_progress issues to open
    /// and clears outcome, implemented as an `update` record.
    pub fn reopen(&self, id: &str) -> StoreResult<Issue> {
        self.update(
            id,
            IssuePatch { status: Some(Status::Open), outcome: Some(None), ..Default::default() },
        )
    }

    pub fn claim(&self, id: &str) -> StoreResult<Issue> {
        let id = self.get(id)?.id;
        let ts_ms = self.clock.epoch_ms();
        self.write_issue_record(IssueLogRecord::Claim { id, ts_ms })?;
        Ok(self.state.read().issues[&id].clone())
    }

    pub fn close(&self, id: &str, outcome: Outcome) -> StoreResult<Issue> {
        let id = self.get(id)?.id;
        let ts_ms = self.clock.epoch_ms();
        self.write_issue_record(IssueLogRecord::Close { id, outcome, ts_ms })?;
        Ok(self.state.read().issues[&id].clone())
    }

    pub fn add_dep(&self, src: &str, dep_type: DepType, dst: &str) -> StoreResult<()> {
        let src = self.get(src)?.id;
        let dst = self.get(dst)?.id;
        let ts_ms = self.clock.epoch_ms();
        self.write_issue_record(IssueLogRecord::AddDep { src, dep_type, dst, ts_ms })
    }

    /// Returns whether an edge was actually removed.
    pub fn remove_dep(&self, src: &str, dep_type: DepType, dst: &str) -> StoreResult<bool> {
        let src = self.get(src)?.id;
        let dst = self.get(dst)?.id;
        let ts_ms = self.clock.epoch_ms();
        // remove_dep never fails on invariants, so apply directly and
        // append only if it actually changed something (mirrors the
        // teacher's write-after-validate ordering for append logs).
        let removed = {
            let mut state = self.state.write();
            state.apply_remove_dep(src, dep_type, dst, ts_ms)
        };
        if removed {
            self.append_issue_log(&IssueLogRecord::RemoveDep { src, dep_type, dst, ts_ms })?;
        }
        Ok(removed)
    }

    /// Reopens every in_progress issue in the subtree; returns the ids it reopened.
    pub fn reset_in_progress(&self, root_id: &str) -> StoreResult<Vec<IssueId>> {
        let ids: Vec<IssueId> = {
            let root = self.get(root_id)?.id;
            let state = self.state.read();
            state
                .subtree_ids(root)
                .into_iter()
                .filter(|id| state.issues.get(id).map(|i| i.status == Status::InProgress).unwrap_or(false))
                .collect()
        };
        for id in &ids {
            self.update(
                id.as_str(),
                IssuePatch { status: Some(Status::Open), outcome: Some(None), ..Default::default() },
            )?;
        }
        Ok(ids)
    }

    pub fn validate(&self, root_id: &str) -> StoreResult<ValidateResult> {
        let root = self.get(root_id)?.id;
        let state = self.state.read();
        for id in state.subtree_ids(root) {
            let Some(issue) = state.issues.get(&id) else { continue };
            if issue.status != Status::Closed {
                return Ok(ValidateResult { is_final: false, reason: format!("{} is not closed", issue.id) });
            }
            match issue.outcome {
                Some(o) if o.is_final_outcome() => {}
                _ => {
                    return Ok(ValidateResult {
                        is_final: false,
                        reason: format!("{} has no final outcome", issue.id),
                    })
                }
            }
        }
        Ok(ValidateResult { is_final: true, reason: "all closed".to_string() })
    }

    fn write_issue_record(&self, record: IssueLogRecord) -> StoreResult<()> {
        // Validate (apply to a clone) before persisting so a rejected write
        // never reaches the log: out-of-order or conflicting records are
        // rejected by the writer, not the reader.
        {
            let mut state = self.state.write();
            state.apply_issue_record(&record)?;
        }
        self.append_issue_log(&record)
    }

    fn append_issue_log(&self, record: &IssueLogRecord) -> StoreResult<()> {
        self.issue_log.lock().append(record)
    }

    // ---- forum ----

    pub fn post(&self, topic: impl Into<String>, body: impl Into<String>, author: impl Into<String>) -> StoreResult<Message> {
        let msg = Message {
            topic: topic.into(),
            author: author.into(),
            body: body.into(),
            created_at: self.clock.epoch_ms(),
        };
        self.forum_log.lock().append(&msg)?;
        self.state.write().forum.push(msg.clone());
        Ok(msg)
    }

    pub fn read(&self, topic: &str, limit: usize) -> Vec<Message> {
        let state = self.state.read();
        let mut out: Vec<Message> = state.forum.iter().filter(|m| m.topic == topic).cloned().collect();
        if out.len() > limit {
            out = out.split_off(out.len() - limit);
        }
        out
    }

    pub fn topics(&self, prefix: Option<&str>) -> Vec<TopicSummary> {
        let state = self.state.read();
        let mut by_topic: BTreeMap<String, (usize, u64)> = BTreeMap::new();
        for msg in &state.forum {
            if let Some(p) = prefix {
                if !msg.topic.starts_with(p) {
                    continue;
                }
            }
            let entry = by_topic.entry(msg.topic.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 = entry.1.max(msg.created_at);
        }
        let mut out: Vec<TopicSummary> = by_topic
            .into_iter()
            .map(|(topic, (messages, last_at))| TopicSummary { topic, messages, last_at })
            .collect();
        out.sort_by(|a, b| b.last_at.cmp(&a.last_at));
        out
    }

    // ---- events ----

    pub fn append_event(&self, event: EventRecord) -> StoreResult<()> {
        self.event_log.lock().append(&event)?;
        self.state.write().events.push(event);
        Ok(())
    }

    pub fn query_events(&self, query: EventQuery) -> Vec<EventRecord> {
        let state = self.state.read();
        query.apply(state.events.iter()).into_iter().cloned().collect()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Materializes the current projection as a minimal issue log — one
    /// `create` per surviving issue, its edges, and its terminal state if
    /// any — and atomically replaces `issues.jsonl` with it. Folds away
    /// history a long-running store would otherwise accumulate forever
    /// (every intermediate `update`/`claim`). Idempotent: compacting an
    /// already-compacted log reproduces an equivalent one. Never called
    /// automatically; exposed as a maintenance operation.
    pub fn compact(&self) -> StoreResult<()> {
        let records = {
            let state = self.state.read();
            let mut out = Vec::with_capacity(state.order.len());
            for id in &state.order {
                let issue = &state.issues[id];
                out.push(IssueLogRecord::Create {
                    id: issue.id,
                    title: issue.title.clone(),
                    body: issue.body.clone(),
                    tags: issue.tags.clone(),
                    priority: issue.priority,
                    ts_ms: issue.created_at,
                });
            }
            for id in &state.order {
                let issue = &state.issues[id];
                if let Some(parent) = issue.parent {
                    out.push(IssueLogRecord::AddDep { src: issue.id, dep_type: DepType::Parent, dst: parent, ts_ms: issue.updated_at });
                }
                for dst in &issue.blocks {
                    out.push(IssueLogRecord::AddDep { src: issue.id, dep_type: DepType::Blocks, dst: *dst, ts_ms: issue.updated_at });
                }
            }
            for id in &state.order {
                let issue = &state.issues[id];
                match (issue.status, issue.outcome) {
                    (Status::Open, None) => {}
                    (Status::Closed, Some(outcome)) => {
                        out.push(IssueLogRecord::Close { id: issue.id, outcome, ts_ms: issue.updated_at })
                    }
                    (status, outcome) => out.push(IssueLogRecord::Update {
                        id: issue.id,
                        patch: IssuePatch { status: Some(status), outcome: Some(outcome), ..Default::default() },
                        ts_ms: issue.updated_at,
                    }),
                }
            }
            out
        };

        let final_path = self.paths.issues_log();
        let tmp_path = final_path.with_extension("jsonl.compact-tmp");
        {
            let mut tmp = AppendLog::open(&tmp_path)?;
            for record in &records {
                tmp.append(record)?;
            }
        }
        let mut guard = self.issue_log.lock();
        std::fs::rename(&tmp_path, &final_path)?;
        *guard = AppendLog::open(&final_path)?;
        tracing::info!(issues = records.len(), "compacted issue log");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
