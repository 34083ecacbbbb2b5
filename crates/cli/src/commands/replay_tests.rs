use super::*;
use foreman_store::{EventRecord, WorkspaceStore};

#[test]
fn replay_finds_events_recorded_against_an_issue() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkspaceStore::open(dir.path()).unwrap();
    let issue = store.create("do it", foreman_store::CreateIssueInput::default()).unwrap();
    store.append_event(EventRecord::new("issue.created", "cli", 1).with_issue(issue.id.clone())).unwrap();

    run(dir.path(), ReplayArgs { id_or_path: issue.id.as_str().to_string(), lines: 200 }, OutputFormat::Text).unwrap();
}

#[test]
fn replay_of_an_unknown_id_is_a_not_found_error() {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();

    let err = run(dir.path(), ReplayArgs { id_or_path: "nonexistent".into(), lines: 200 }, OutputFormat::Text).unwrap_err();
    assert_eq!(err.kind, foreman_core::ErrorKind::NotFound);
}

#[test]
fn replay_of_a_real_file_tails_it_directly() {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();
    let log_path = dir.path().join("run.log");
    std::fs::write(&log_path, "line one\nline two\n").unwrap();

    run(dir.path(), ReplayArgs { id_or_path: log_path.display().to_string(), lines: 10 }, OutputFormat::Text).unwrap();
}
