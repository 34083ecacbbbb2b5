use super::*;
use foreman_store::WorkspaceStore;

fn repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    WorkspaceStore::open(dir.path()).unwrap();
    dir
}

#[test]
fn post_then_read_round_trips() {
    let dir = repo();
    run(dir.path(), ForumArgs { command: ForumCommand::Post { topic: "build".into(), body: "green".into(), author: "ci".into() } }, OutputFormat::Text).unwrap();
    run(dir.path(), ForumArgs { command: ForumCommand::Read { topic: "build".into(), limit: 10 } }, OutputFormat::Text).unwrap();
}

#[test]
fn topics_lists_posted_threads() {
    let dir = repo();
    run(dir.path(), ForumArgs { command: ForumCommand::Post { topic: "build".into(), body: "green".into(), author: "ci".into() } }, OutputFormat::Text).unwrap();
    run(dir.path(), ForumArgs { command: ForumCommand::Topics { prefix: None } }, OutputFormat::Text).unwrap();
}
