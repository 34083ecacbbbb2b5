use super::*;
use foreman_store::WorkspaceStore;
use tempfile::TempDir;

fn repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();
    dir
}

#[test]
fn create_then_list_finds_the_issue() {
    let dir = repo();
    run(dir.path(), IssuesArgs { command: IssuesCommand::Create { title: "ship it".into(), body: String::new(), tags: vec!["infra".into()], priority: Some(2) } }, OutputFormat::Text).unwrap();

    run(dir.path(), IssuesArgs { command: IssuesCommand::List { status: None, tag: None } }, OutputFormat::Text).unwrap();
}

#[test]
fn claim_then_close_round_trips_through_outcome() {
    let dir = repo();
    let id = {
        let store = WorkspaceStore::open(dir.path()).unwrap();
        store.create("do it", foreman_store::CreateIssueInput::default()).unwrap().id
    };

    run(dir.path(), IssuesArgs { command: IssuesCommand::Claim { id: id.as_str().to_string() } }, OutputFormat::Text).unwrap();
    run(dir.path(), IssuesArgs { command: IssuesCommand::Close { id: id.as_str().to_string(), outcome: "success".into() } }, OutputFormat::Text).unwrap();

    let store = WorkspaceStore::open(dir.path()).unwrap();
    let issue = store.get(id.as_str()).unwrap();
    assert_eq!(issue.status, foreman_store::Status::Closed);
    assert_eq!(issue.outcome, Some(foreman_store::Outcome::Success));
}

#[test]
fn close_rejects_an_unknown_outcome() {
    let dir = repo();
    let id = {
        let store = WorkspaceStore::open(dir.path()).unwrap();
        store.create("do it", foreman_store::CreateIssueInput::default()).unwrap().id
    };

    let err = run(dir.path(), IssuesArgs { command: IssuesCommand::Close { id: id.as_str().to_string(), outcome: "whoops".into() } }, OutputFormat::Text).unwrap_err();
    assert_eq!(err.kind, foreman_core::ErrorKind::InvalidInput);
}

#[test]
fn dep_then_undep_round_trips() {
    let dir = repo();
    let (a, b) = {
        let store = WorkspaceStore::open(dir.path()).unwrap();
        let a = store.create("a", foreman_store::CreateIssueInput::default()).unwrap().id;
        let b = store.create("b", foreman_store::CreateIssueInput::default()).unwrap().id;
        (a, b)
    };

    run(dir.path(), IssuesArgs { command: IssuesCommand::Dep { src: a.as_str().to_string(), dep_type: DepTypeArg::Blocks, dst: b.as_str().to_string() } }, OutputFormat::Text).unwrap();
    run(dir.path(), IssuesArgs { command: IssuesCommand::Undep { src: a.as_str().to_string(), dep_type: DepTypeArg::Blocks, dst: b.as_str().to_string() } }, OutputFormat::Text).unwrap();
}
