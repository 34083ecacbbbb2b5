use super::*;

fn dummy_issue() -> Issue {
    Issue {
        id: foreman_core::IssueId::new(),
        title: "t".into(),
        body: "b".into(),
        status: foreman_store::Status::Open,
        outcome: None,
        priority: 3,
        tags: Default::default(),
        blocks: Default::default(),
        parent: None,
        created_at: 0,
        updated_at: 0,
    }
}

#[tokio::test]
async fn mock_backend_plays_scripted_results_in_order() {
    let backend = MockBackendRunner::new();
    backend.push_outcome(Outcome::NeedsWork);
    backend.push_outcome(Outcome::Success);

    let issue = dummy_issue();
    let ctx = StepContext { role: Role::Worker, forum_thread: vec![] };

    let first = backend.run_step(&issue, &ctx, "prompt").await.unwrap();
    assert_eq!(first.outcome, Outcome::NeedsWork);
    let second = backend.run_step(&issue, &ctx, "prompt").await.unwrap();
    assert_eq!(second.outcome, Outcome::Success);
}

#[tokio::test]
async fn mock_backend_defaults_to_success_once_script_is_empty() {
    let backend = MockBackendRunner::new();
    let issue = dummy_issue();
    let ctx = StepContext { role: Role::Worker, forum_thread: vec![] };
    let result = backend.run_step(&issue, &ctx, "prompt").await.unwrap();
    assert_eq!(result.outcome, Outcome::Success);
}
