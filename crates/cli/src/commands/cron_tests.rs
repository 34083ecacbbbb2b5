use super::*;
use crate::env::SERVER_URL;
use serial_test::serial;

#[test]
fn create_requires_a_schedule() {
    let schedule = ScheduleArgs { every_ms: None, at_ms: None, cron_expr: None, tz: "UTC".into() };
    let err = schedule.require().unwrap_err();
    assert_eq!(err.kind, foreman_core::ErrorKind::InvalidInput);
}

#[tokio::test]
#[serial]
async fn list_against_an_unreachable_override_url_reports_server_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    foreman_store::WorkspaceStore::open(dir.path()).unwrap();
    std::env::set_var(SERVER_URL, "http://127.0.0.1:1");

    let err = run(dir.path(), CronArgs { command: CronCommand::List }, OutputFormat::Text).await.unwrap_err();

    std::env::remove_var(SERVER_URL);
    assert_eq!(err.kind, foreman_core::ErrorKind::ServerUnreachable);
}
