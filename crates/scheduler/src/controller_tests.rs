use super::*;
use foreman_core::FakeClock;
use foreman_runner::MockBackendRunner;
use foreman_store::{StorePaths, WorkspaceStore};

fn open_controller() -> (tempfile::TempDir, Arc<WorkspaceStore<FakeClock>>, SchedulerController<FakeClock>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    let store = Arc::new(WorkspaceStore::open_with_clock(paths.clone(), FakeClock::new()).unwrap());
    let backend = Arc::new(MockBackendRunner::new());
    let controller = SchedulerController::open(&paths, Arc::clone(&store), backend).unwrap();
    (dir, store, controller)
}

fn target_for(job_id: foreman_core::RunId) -> Target {
    Target::Run { job_id: Some(job_id), root_issue_id: None }
}

#[tokio::test]
async fn enqueueing_then_ticking_creates_a_root_and_runs_it_to_completion() {
    let (_dir, store, controller) = open_controller();
    let run = controller.enqueue_run("do the thing".into(), 5, "agent".into(), RunSource::Cli).unwrap();
    assert_eq!(run.status, RunStatus::Queued);

    let acted = controller.tick_queue().await.unwrap();
    assert_eq!(acted, Some(run.job_id));

    let snapshot = controller.get_run(run.job_id.as_str()).unwrap();
    assert_eq!(snapshot.status, RunStatus::Succeeded);
    assert!(snapshot.root_issue_id.is_some());
    assert_eq!(snapshot.exit_code, Some(0));

    let root = snapshot.root_issue_id.unwrap();
    assert!(store.validate(root.as_str()).unwrap().is_final);
}

#[tokio::test]
async fn tick_queue_is_a_noop_when_nothing_is_queued() {
    let (_dir, _store, controller) = open_controller();
    assert_eq!(controller.tick_queue().await.unwrap(), None);
}

#[tokio::test]
async fn trace_run_reports_the_root_issues_event_trail() {
    let (_dir, _store, controller) = open_controller();
    let run = controller.enqueue_run("do the thing".into(), 5, "agent".into(), RunSource::Cli).unwrap();
    controller.tick_queue().await.unwrap();
    let trace = controller.trace_run(run.job_id.as_str()).unwrap();
    assert!(trace.iter().any(|e| e.event_type == "step:end"));
}

#[test]
fn heartbeat_tick_advances_and_records_ok_for_an_active_run() {
    let (_dir, _store, controller) = open_controller();
    let run = controller.enqueue_run("watch me".into(), 5, "agent".into(), RunSource::Cli).unwrap();
    let program = controller.create_heartbeat("nudge".into(), target_for(run.job_id), 1_000, WakeMode::Nudge).unwrap();

    let fired = controller.tick_heartbeats(2_000).unwrap();
    assert_eq!(fired, vec![program.program_id]);

    let updated = controller.get_heartbeat(program.program_id.as_str()).unwrap();
    assert_eq!(updated.last_result.as_deref(), Some("ok"));
    assert_eq!(updated.next_trigger_at_ms, 3_000);
}

#[test]
fn heartbeat_tick_is_a_noop_before_the_trigger_time() {
    let (_dir, _store, controller) = open_controller();
    let run = controller.enqueue_run("watch me".into(), 5, "agent".into(), RunSource::Cli).unwrap();
    controller.create_heartbeat("nudge".into(), target_for(run.job_id), 10_000, WakeMode::Nudge).unwrap();
    assert!(controller.tick_heartbeats(500).unwrap().is_empty());
}

#[test]
fn heartbeat_tick_records_an_error_for_a_target_run_that_no_longer_exists() {
    let (_dir, _store, controller) = open_controller();
    let phantom = foreman_core::RunId::new();
    controller.create_heartbeat("nudge".into(), target_for(phantom), 0, WakeMode::Nudge).unwrap();
    let fired = controller.tick_heartbeats(1_000).unwrap();
    assert_eq!(fired.len(), 1);
    let updated = controller.list_heartbeats().remove(0);
    assert_eq!(updated.last_result.as_deref(), Some("error"));
    assert!(updated.reason.is_some());
}

#[test]
fn cron_tick_enqueues_a_run_and_advances_an_every_schedule() {
    let (_dir, _store, controller) = open_controller();
    let program =
        controller.create_cron("nightly sweep".into(), "sweep the backlog".into(), Schedule::Every { every_ms: 1_000 }).unwrap();

    let fired = controller.tick_cron(0).unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(controller.list_runs().len(), 1);

    let updated = controller.get_cron(program.program_id.as_str()).unwrap();
    assert_eq!(updated.next_run_at_ms, 1_000);
    assert!(updated.enabled);
}

#[test]
fn cron_tick_disables_a_one_shot_at_schedule_after_firing() {
    let (_dir, _store, controller) = open_controller();
    let program = controller.create_cron("one shot".into(), "run once".into(), Schedule::At { at_ms: 0 }).unwrap();
    controller.tick_cron(0).unwrap();
    let updated = controller.get_cron(program.program_id.as_str()).unwrap();
    assert!(!updated.enabled);
}

#[test]
fn cron_status_counts_enabled_and_armed_programs() {
    let (_dir, _store, controller) = open_controller();
    controller.create_cron("a".into(), "go".into(), Schedule::Every { every_ms: 1_000 }).unwrap();
    let disabled = controller.create_cron("b".into(), "go".into(), Schedule::At { at_ms: 0 }).unwrap();
    controller.tick_cron(0).unwrap();
    let status = controller.cron_status();
    assert_eq!(status.count, 2);
    assert_eq!(status.enabled_count, 1);
    assert_eq!(status.armed_count, 1);
    assert!(controller.get_cron(disabled.program_id.as_str()).unwrap().enabled == false);
}

#[test]
fn deleting_a_heartbeat_removes_it_from_the_listing() {
    let (_dir, _store, controller) = open_controller();
    let program = controller.create_heartbeat("nudge".into(), Target::Run { job_id: None, root_issue_id: None }, 1_000, WakeMode::Nudge).unwrap();
    controller.delete_heartbeat(program.program_id.as_str()).unwrap();
    assert!(controller.get_heartbeat(program.program_id.as_str()).is_err());
    assert!(controller.list_heartbeats().is_empty());
}

#[test]
fn updating_a_heartbeat_patches_only_the_given_fields() {
    let (_dir, _store, controller) = open_controller();
    let program = controller.create_heartbeat("nudge".into(), Target::Run { job_id: None, root_issue_id: None }, 1_000, WakeMode::Nudge).unwrap();

    let updated = controller
        .update_heartbeat(program.program_id.as_str(), HeartbeatPatch { enabled: Some(false), ..Default::default() })
        .unwrap();
    assert!(!updated.enabled);
    assert_eq!(updated.title, "nudge");
    assert_eq!(updated.every_ms, 1_000);
}

#[test]
fn updating_a_cron_schedule_recomputes_the_next_fire_time() {
    let (_dir, _store, controller) = open_controller();
    let program = controller.create_cron("sweep".into(), "go".into(), Schedule::Every { every_ms: 1_000 }).unwrap();

    let updated = controller
        .update_cron(program.program_id.as_str(), CronPatch { schedule: Some(Schedule::At { at_ms: 5_000 }), ..Default::default() })
        .unwrap();
    assert_eq!(updated.schedule, Schedule::At { at_ms: 5_000 });
    assert_eq!(updated.next_run_at_ms, 5_000);
}

#[test]
fn reopening_the_controller_replays_journals_into_the_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    let store = Arc::new(WorkspaceStore::open_with_clock(paths.clone(), FakeClock::new()).unwrap());
    let backend = Arc::new(MockBackendRunner::new());
    let job_id = {
        let controller = SchedulerController::open(&paths, Arc::clone(&store), backend.clone()).unwrap();
        let run = controller.enqueue_run("persisted".into(), 3, "agent".into(), RunSource::Cli).unwrap();
        controller.create_cron("sweep".into(), "go".into(), Schedule::Every { every_ms: 60_000 }).unwrap();
        run.job_id
    };

    let reopened = SchedulerController::open(&paths, store, backend).unwrap();
    assert!(reopened.get_run(job_id.as_str()).is_ok());
    assert_eq!(reopened.list_cron().len(), 1);
}
