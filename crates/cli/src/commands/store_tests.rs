use super::*;
use foreman_store::WorkspaceStore;

#[test]
fn paths_reports_the_on_disk_layout() {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();

    run(dir.path(), StoreArgs { command: StoreCommand::Paths }, OutputFormat::Text).unwrap();
}

#[test]
fn ls_on_a_missing_run_dir_is_empty_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();

    run(dir.path(), StoreArgs { command: StoreCommand::Ls { root: "does-not-exist".into() } }, OutputFormat::Text).unwrap();
}

#[test]
fn tail_rejects_an_unknown_log_name() {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();

    let err = run(dir.path(), StoreArgs { command: StoreCommand::Tail { log: "bogus".into(), lines: 10 } }, OutputFormat::Text).unwrap_err();
    assert_eq!(err.kind, foreman_core::ErrorKind::InvalidInput);
}

#[test]
fn tail_of_the_issues_log_shows_recorded_creates() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkspaceStore::open(dir.path()).unwrap();
    store.create("do it", foreman_store::CreateIssueInput::default()).unwrap();

    run(dir.path(), StoreArgs { command: StoreCommand::Tail { log: "issues".into(), lines: 10 } }, OutputFormat::Text).unwrap();
}
