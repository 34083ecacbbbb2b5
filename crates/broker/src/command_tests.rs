use super::*;

#[test]
fn run_start_rejects_an_empty_prompt() {
    let cmd = ApprovedCommand::RunStart { prompt: "  ".into(), max_steps: None };
    assert_eq!(cmd.validate(), Err("run_start.prompt is empty"));
}

#[test]
fn run_start_rejects_max_steps_out_of_range() {
    let cmd = ApprovedCommand::RunStart { prompt: "go".into(), max_steps: Some(0) };
    assert!(cmd.validate().is_err());
    let cmd = ApprovedCommand::RunStart { prompt: "go".into(), max_steps: Some(501) };
    assert!(cmd.validate().is_err());
}

#[test]
fn forum_read_accepts_a_limit_within_range() {
    let cmd = ApprovedCommand::ForumRead { topic: None, limit: Some(500) };
    assert!(cmd.validate().is_ok());
}

#[test]
fn run_triggers_are_identified_correctly() {
    assert!(ApprovedCommand::RunStart { prompt: "go".into(), max_steps: None }.is_run_trigger());
    assert!(ApprovedCommand::RunResume { root_issue_id: None, max_steps: None }.is_run_trigger());
    assert!(ApprovedCommand::RunInterrupt { root_issue_id: None }.is_run_trigger());
    assert!(!ApprovedCommand::Status.is_run_trigger());
}
