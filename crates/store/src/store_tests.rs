use super::*;
use crate::issue::well_known_tags;
use foreman_core::FakeClock;
use tempfile::tempdir;

fn open_store() -> (tempfile::TempDir, WorkspaceStore<FakeClock>) {
    let dir = tempdir().unwrap();
    let store = WorkspaceStore::open_with_clock(StorePaths::new(dir.path()), FakeClock::new()).unwrap();
    (dir, store)
}

#[test]
fn create_then_get_round_trips() {
    let (_dir, store) = open_store();
    let issue = store.create("do the thing", CreateIssueInput::default()).unwrap();
    let fetched = store.get(issue.id.as_str()).unwrap();
    assert_eq!(fetched.title, "do the thing");
    assert_eq!(fetched.status, Status::Open);
    assert_eq!(fetched.priority, DEFAULT_PRIORITY);
}

#[test]
fn create_rejects_empty_title() {
    let (_dir, store) = open_store();
    let err = store.create("  ", CreateIssueInput::default()).unwrap_err();
    assert_eq!(err.kind(), foreman_core::ErrorKind::InvalidInput);
}

#[test]
fn create_rejects_out_of_range_priority() {
    let (_dir, store) = open_store();
    let input = CreateIssueInput { priority: Some(9), ..Default::default() };
    assert!(store.create("x", input).is_err());
}

#[test]
fn get_resolves_unique_prefix() {
    let (_dir, store) = open_store();
    let issue = store.create("only one", CreateIssueInput::default()).unwrap();
    let prefix = &issue.id.as_str()[..6];
    let fetched = store.get(prefix).unwrap();
    assert_eq!(fetched.id, issue.id);
}

#[test]
fn get_reports_not_found_for_unknown_prefix() {
    let (_dir, store) = open_store();
    store.create("a", CreateIssueInput::default()).unwrap();
    let err = store.get("iss-zzzzzzzzzzzzzzzzzzz").unwrap_err();
    assert_eq!(err.kind(), foreman_core::ErrorKind::NotFound);
}

#[test]
fn get_reports_ambiguous_for_shared_prefix() {
    let (_dir, store) = open_store();
    let a = store.create("a", CreateIssueInput::default()).unwrap();
    let shared = &a.id.as_str()[..4]; // the "iss-" prefix matches every issue
    store.create("b", CreateIssueInput::default()).unwrap();
    let err = store.get(shared).unwrap_err();
    assert_eq!(err.kind(), foreman_core::ErrorKind::Ambiguous);
}

#[test]
fn claim_then_close_updates_status_and_outcome() {
    let (_dir, store) = open_store();
    let issue = store.create("work", CreateIssueInput::default()).unwrap();
    let claimed = store.claim(issue.id.as_str()).unwrap();
    assert_eq!(claimed.status, Status::InProgress);
    let closed = store.close(issue.id.as_str(), Outcome::Success).unwrap();
    assert_eq!(closed.status, Status::Closed);
    assert_eq!(closed.outcome, Some(Outcome::Success));
}

#[test]
fn claim_rejects_non_open_issue() {
    let (_dir, store) = open_store();
    let issue = store.create("work", CreateIssueInput::default()).unwrap();
    store.claim(issue.id.as_str()).unwrap();
    assert!(store.claim(issue.id.as_str()).is_err());
}

#[test]
fn ready_excludes_blocked_issues() {
    let (_dir, store) = open_store();
    let blocker = store.create("blocker", CreateIssueInput::default()).unwrap();
    let blocked = store.create("blocked", CreateIssueInput::default()).unwrap();
    store.add_dep(blocker.id.as_str(), DepType::Blocks, blocked.id.as_str()).unwrap();

    let ready_ids: Vec<_> = store.ready(None, ReadyFilter::default()).unwrap().into_iter().map(|i| i.id).collect();
    assert!(ready_ids.contains(&blocker.id));
    assert!(!ready_ids.contains(&blocked.id));

    store.close(blocker.id.as_str(), Outcome::Success).unwrap();
    let ready_ids: Vec<_> = store.ready(None, ReadyFilter::default()).unwrap().into_iter().map(|i| i.id).collect();
    assert!(ready_ids.contains(&blocked.id));
}

#[test]
fn ready_excludes_issues_with_open_children() {
    let (_dir, store) = open_store();
    let parent = store.create("parent", CreateIssueInput::default()).unwrap();
    let child = store.create("child", CreateIssueInput::default()).unwrap();
    store.add_dep(child.id.as_str(), DepType::Parent, parent.id.as_str()).unwrap();

    let ready_ids: Vec<_> = store.ready(None, ReadyFilter::default()).unwrap().into_iter().map(|i| i.id).collect();
    assert!(!ready_ids.contains(&parent.id));
    assert!(ready_ids.contains(&child.id));
}

#[test]
fn ready_is_ordered_by_priority_then_created_at() {
    let (_dir, store) = open_store();
    let low = store.create("low", CreateIssueInput { priority: Some(5), ..Default::default() }).unwrap();
    let high = store.create("high", CreateIssueInput { priority: Some(1), ..Default::default() }).unwrap();
    let ready = store.ready(None, ReadyFilter::default()).unwrap();
    assert_eq!(ready[0].id, high.id);
    assert_eq!(ready[1].id, low.id);
}

#[test]
fn ready_filters_by_required_tags() {
    let (_dir, store) = open_store();
    let mut tags = std::collections::BTreeSet::new();
    tags.insert(well_known_tags::NODE_AGENT.to_string());
    store.create("agent-work", CreateIssueInput { tags, ..Default::default() }).unwrap();
    store.create("plain-work", CreateIssueInput::default()).unwrap();

    let filter = ReadyFilter { tags: vec![well_known_tags::NODE_AGENT.to_string()], ..Default::default() };
    let ready = store.ready(None, filter).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].title, "agent-work");
}

#[test]
fn add_dep_rejects_self_edge() {
    let (_dir, store) = open_store();
    let issue = store.create("a", CreateIssueInput::default()).unwrap();
    assert!(store.add_dep(issue.id.as_str(), DepType::Blocks, issue.id.as_str()).is_err());
}

#[test]
fn add_dep_rejects_blocks_cycle() {
    let (_dir, store) = open_store();
    let a = store.create("a", CreateIssueInput::default()).unwrap();
    let b = store.create("b", CreateIssueInput::default()).unwrap();
    store.add_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap();
    let err = store.add_dep(b.id.as_str(), DepType::Blocks, a.id.as_str()).unwrap_err();
    assert_eq!(err.kind(), foreman_core::ErrorKind::InvalidInput);
}

#[test]
fn add_dep_blocks_is_idempotent() {
    let (_dir, store) = open_store();
    let a = store.create("a", CreateIssueInput::default()).unwrap();
    let b = store.create("b", CreateIssueInput::default()).unwrap();
    store.add_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap();
    store.add_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap();
    assert_eq!(store.get(a.id.as_str()).unwrap().blocks.len(), 1);
}

#[test]
fn add_dep_rejects_a_second_distinct_parent() {
    let (_dir, store) = open_store();
    let child = store.create("child", CreateIssueInput::default()).unwrap();
    let p1 = store.create("p1", CreateIssueInput::default()).unwrap();
    let p2 = store.create("p2", CreateIssueInput::default()).unwrap();
    store.add_dep(child.id.as_str(), DepType::Parent, p1.id.as_str()).unwrap();
    assert!(store.add_dep(child.id.as_str(), DepType::Parent, p2.id.as_str()).is_err());
}

#[test]
fn add_dep_rejects_parent_cycle() {
    let (_dir, store) = open_store();
    let a = store.create("a", CreateIssueInput::default()).unwrap();
    let b = store.create("b", CreateIssueInput::default()).unwrap();
    store.add_dep(b.id.as_str(), DepType::Parent, a.id.as_str()).unwrap();
    assert!(store.add_dep(a.id.as_str(), DepType::Parent, b.id.as_str()).is_err());
}

#[test]
fn remove_dep_reports_whether_anything_changed() {
    let (_dir, store) = open_store();
    let a = store.create("a", CreateIssueInput::default()).unwrap();
    let b = store.create("b", CreateIssueInput::default()).unwrap();
    store.add_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap();
    assert!(store.remove_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap());
    assert!(!store.remove_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap());
}

#[test]
fn subtree_ids_includes_root_and_descendants() {
    let (_dir, store) = open_store();
    let root = store.create("root", CreateIssueInput::default()).unwrap();
    let child = store.create("child", CreateIssueInput::default()).unwrap();
    let grandchild = store.create("grandchild", CreateIssueInput::default()).unwrap();
    store.add_dep(child.id.as_str(), DepType::Parent, root.id.as_str()).unwrap();
    store.add_dep(grandchild.id.as_str(), DepType::Parent, child.id.as_str()).unwrap();

    let ids = store.subtree_ids(root.id.as_str()).unwrap();
    assert!(ids.contains(&root.id));
    assert!(ids.contains(&child.id));
    assert!(ids.contains(&grandchild.id));
}

#[test]
fn validate_is_final_only_when_whole_subtree_is_closed_with_final_outcome() {
    let (_dir, store) = open_store();
    let root = store.create("root", CreateIssueInput::default()).unwrap();
    let child = store.create("child", CreateIssueInput::default()).unwrap();
    store.add_dep(child.id.as_str(), DepType::Parent, root.id.as_str()).unwrap();

    assert!(!store.validate(root.id.as_str()).unwrap().is_final);

    store.close(child.id.as_str(), Outcome::Success).unwrap();
    assert!(!store.validate(root.id.as_str()).unwrap().is_final);

    store.close(root.id.as_str(), Outcome::Success).unwrap();
    assert!(store.validate(root.id.as_str()).unwrap().is_final);
}

#[test]
fn validate_rejects_non_final_outcome() {
    let (_dir, store) = open_store();
    let root = store.create("root", CreateIssueInput::default()).unwrap();
    store.close(root.id.as_str(), Outcome::Failure).unwrap();
    assert!(!store.validate(root.id.as_str()).unwrap().is_final);
}

#[test]
fn reset_in_progress_reopens_only_in_progress_descendants() {
    let (_dir, store) = open_store();
    let root = store.create("root", CreateIssueInput::default()).unwrap();
    let in_progress = store.create("a", CreateIssueInput::default()).unwrap();
    let open_already = store.create("b", CreateIssueInput::default()).unwrap();
    store.add_dep(in_progress.id.as_str(), DepType::Parent, root.id.as_str()).unwrap();
    store.add_dep(open_already.id.as_str(), DepType::Parent, root.id.as_str()).unwrap();
    store.claim(in_progress.id.as_str()).unwrap();

    let reset = store.reset_in_progress(root.id.as_str()).unwrap();
    assert_eq!(reset, vec![in_progress.id]);
    assert_eq!(store.get(in_progress.id.as_str()).unwrap().status, Status::Open);
}

#[test]
fn reopen_clears_outcome_and_reopens_a_closed_issue() {
    let (_dir, store) = open_store();
    let issue = store.create("a", CreateIssueInput::default()).unwrap();
    store.close(issue.id.as_str(), Outcome::Failure).unwrap();
    let reopened = store.reopen(issue.id.as_str()).unwrap();
    assert_eq!(reopened.status, Status::Open);
    assert_eq!(reopened.outcome, None);
}

#[test]
fn forum_read_keeps_only_the_last_n_messages_per_topic() {
    let (_dir, store) = open_store();
    for i in 0..5 {
        store.post("issue:x", format!("message {i}"), "worker").unwrap();
    }
    let last_two = store.read("issue:x", 2);
    assert_eq!(last_two.len(), 2);
    assert_eq!(last_two[0].body, "message 3");
    assert_eq!(last_two[1].body, "message 4");
}

#[test]
fn topics_summarizes_message_counts_and_last_activity() {
    let (_dir, store) = open_store();
    store.post("issue:a", "hi", "w1").unwrap();
    store.post("issue:a", "again", "w1").unwrap();
    store.post("issue:b", "other", "w2").unwrap();

    let topics = store.topics(None);
    let a = topics.iter().find(|t| t.topic == "issue:a").unwrap();
    assert_eq!(a.messages, 2);
}

#[test]
fn events_query_roundtrips_through_the_log() {
    let (_dir, store) = open_store();
    let issue = store.create("a", CreateIssueInput::default()).unwrap();
    store.append_event(EventRecord::new("issue:created", "store", 1).with_issue(issue.id)).unwrap();

    let found = store.query_events(EventQuery { issue_id: Some(issue.id), ..Default::default() });
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event_type, "issue:created");
}

#[test]
fn reopening_the_store_replays_the_logs_into_the_same_projection() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    let issue_id;
    {
        let store = WorkspaceStore::open_with_clock(paths.clone(), FakeClock::new()).unwrap();
        let issue = store.create("persisted", CreateIssueInput::default()).unwrap();
        issue_id = issue.id;
        store.claim(issue.id.as_str()).unwrap();
    }
    let store = WorkspaceStore::open_with_clock(paths, FakeClock::new()).unwrap();
    let reloaded = store.get(issue_id.as_str()).unwrap();
    assert_eq!(reloaded.status, Status::InProgress);
    assert_eq!(reloaded.title, "persisted");
}

#[test]
fn compact_preserves_the_projection_across_a_reopen() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    let (a, b) = {
        let store = WorkspaceStore::open_with_clock(paths.clone(), FakeClock::new()).unwrap();
        let a = store.create("a", CreateIssueInput::default()).unwrap();
        let b = store.create("b", CreateIssueInput::default()).unwrap();
        store.add_dep(a.id.as_str(), DepType::Blocks, b.id.as_str()).unwrap();
        store.close(a.id.as_str(), Outcome::Success).unwrap();
        store.claim(b.id.as_str()).unwrap();
        store.compact().unwrap();
        (a.id, b.id)
    };

    let lines_before = std::fs::read_to_string(paths.issues_log()).unwrap().lines().count();
    assert_eq!(lines_before, 5); // 2 creates + 1 add_dep + 1 close(a) + 1 update(b's in_progress status)

    let store = WorkspaceStore::open_with_clock(paths, FakeClock::new()).unwrap();
    let reloaded_a = store.get(a.as_str()).unwrap();
    assert_eq!(reloaded_a.status, Status::Closed);
    assert_eq!(reloaded_a.outcome, Some(Outcome::Success));
    let reloaded_b = store.get(b.as_str()).unwrap();
    assert_eq!(reloaded_b.status, Status::InProgress);
    assert!(reloaded_a.blocks.contains(&b));
}

#[test]
fn compacting_an_already_compacted_log_is_a_no_op() {
    let (_dir, store) = open_store();
    let issue = store.create("solo", CreateIssueInput::default()).unwrap();
    store.compact().unwrap();
    let projection_before = store.get(issue.id.as_str()).unwrap();
    store.compact().unwrap();
    let projection_after = store.get(issue.id.as_str()).unwrap();
    assert_eq!(projection_before, projection_after);
}
