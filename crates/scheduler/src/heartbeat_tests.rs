use super::*;

#[test]
fn new_program_arms_next_trigger_one_period_out() {
    let program = HeartbeatProgram::new(
        "nudge it".into(),
        Target::Run { job_id: None, root_issue_id: None },
        60_000,
        WakeMode::Nudge,
        1_000,
    );
    assert_eq!(program.next_trigger_at_ms, 61_000);
    assert!(program.enabled);
}

#[test]
fn auto_disable_flag_reads_from_metadata() {
    let mut program = HeartbeatProgram::new(
        "nudge it".into(),
        Target::Run { job_id: None, root_issue_id: None },
        60_000,
        WakeMode::Nudge,
        0,
    );
    assert!(!program.auto_disable_on_terminal());
    program.metadata.insert("auto_disable_on_terminal".into(), "true".into());
    assert!(program.auto_disable_on_terminal());
}
