use super::*;
use crate::backend::MockBackendRunner;
use foreman_core::FakeClock;
use foreman_store::{issue::well_known_tags, CreateIssueInput, StorePaths};
use std::collections::BTreeSet;

fn root_store() -> (tempfile::TempDir, Arc<WorkspaceStore<FakeClock>>) {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkspaceStore::open_with_clock(StorePaths::new(dir.path()), FakeClock::new()).unwrap();
    (dir, Arc::new(store))
}

fn root_tags() -> BTreeSet<String> {
    [well_known_tags::NODE_ROOT, well_known_tags::NODE_AGENT].into_iter().map(String::from).collect()
}

#[tokio::test]
async fn runs_to_root_final_when_the_only_issue_succeeds() {
    let (_dir, store) = root_store();
    let root = store.create("Write hello", CreateIssueInput { tags: root_tags(), ..Default::default() }).unwrap();

    let backend = Arc::new(MockBackendRunner::new());
    backend.push_outcome(Outcome::Success);
    let runner = DagRunner::new(Arc::clone(&store), backend);

    let exit = runner.run(root.id.as_str(), 2).await.unwrap();
    assert_eq!(exit, RunExit::RootFinal);

    let closed = store.get(root.id.as_str()).unwrap();
    assert_eq!(closed.status, foreman_store::Status::Closed);
    assert_eq!(closed.outcome, Some(Outcome::Success));

    let events = store.query_events(foreman_store::EventQuery { event_type: Some("step:end".into()), ..Default::default() });
    assert_eq!(events.len(), 1);

    assert!(store.validate(root.id.as_str()).unwrap().is_final);
}

#[tokio::test]
async fn stops_at_max_steps_without_finishing() {
    let (_dir, store) = root_store();
    let root = store.create("Write hello", CreateIssueInput { tags: root_tags(), ..Default::default() }).unwrap();

    let backend = Arc::new(MockBackendRunner::new());
    backend.push_outcome(Outcome::NeedsWork);
    let runner = DagRunner::new(Arc::clone(&store), backend);

    let exit = runner.run(root.id.as_str(), 1).await.unwrap();
    assert_eq!(exit, RunExit::MaxStepsReached);
    assert_eq!(store.get(root.id.as_str()).unwrap().status, foreman_store::Status::Closed);
}

#[tokio::test]
async fn deadlocks_when_a_non_final_issue_has_no_ready_successor() {
    let (_dir, store) = root_store();
    let root = store.create("Write hello", CreateIssueInput { tags: root_tags(), ..Default::default() }).unwrap();
    store.claim(root.id.as_str()).unwrap();
    store.update(root.id.as_str(), foreman_store::IssuePatch {
        tags: Some([well_known_tags::NODE_ROOT.to_string()].into_iter().collect()),
        status: Some(foreman_store::Status::Open),
        ..Default::default()
    }).unwrap();

    let backend = Arc::new(MockBackendRunner::new());
    let runner = DagRunner::new(Arc::clone(&store), backend);
    let exit = runner.run(root.id.as_str(), 3).await.unwrap();
    assert!(matches!(exit, RunExit::Deadlock { .. }));
}

#[tokio::test]
async fn resume_clears_in_progress_before_the_loop_begins() {
    let (_dir, store) = root_store();
    let root = store.create("Write hello", CreateIssueInput { tags: root_tags(), ..Default::default() }).unwrap();
    store.claim(root.id.as_str()).unwrap();
    assert_eq!(store.get(root.id.as_str()).unwrap().status, foreman_store::Status::InProgress);

    let backend = Arc::new(MockBackendRunner::new());
    backend.push_outcome(Outcome::Success);
    let runner = DagRunner::new(Arc::clone(&store), backend);
    let exit = runner.run(root.id.as_str(), 1).await.unwrap();
    assert_eq!(exit, RunExit::RootFinal);
}
