use super::*;

#[test]
fn display_shows_the_message_only() {
    let err = CliError::new(ErrorKind::NotFound, "issue iss-xyz not found");
    assert_eq!(err.to_string(), "issue iss-xyz not found");
}

#[test]
fn exit_code_follows_the_kind() {
    let err = CliError::new(ErrorKind::InvalidInput, "bad input");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn with_hints_collects_recovery_suggestions() {
    let err = CliError::new(ErrorKind::BackendError, "backend crashed").with_hints(["fm replay iss-xyz", "fm resume iss-xyz"]);
    assert_eq!(err.hints, vec!["fm replay iss-xyz".to_string(), "fm resume iss-xyz".to_string()]);
}
