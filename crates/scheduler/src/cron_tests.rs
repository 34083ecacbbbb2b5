use super::*;

#[test]
fn new_program_computes_its_first_fire_from_the_schedule() {
    let schedule = Schedule::Every { every_ms: 1_000 };
    let program = CronProgram::new("nightly sweep".into(), "sweep the backlog".into(), schedule, 500).unwrap();
    assert_eq!(program.next_run_at_ms, 500);
    assert!(program.enabled);
}

#[test]
fn every_schedule_uses_now_when_there_is_no_previous_fire() {
    let schedule = Schedule::Every { every_ms: 1_000 };
    assert_eq!(compute_next_run_at_ms(&schedule, None, 500).unwrap(), 500);
}

#[test]
fn every_schedule_adds_the_period_to_the_previous_fire() {
    let schedule = Schedule::Every { every_ms: 1_000 };
    assert_eq!(compute_next_run_at_ms(&schedule, Some(500), 900).unwrap(), 1_500);
}

#[test]
fn at_schedule_always_returns_its_fixed_time() {
    let schedule = Schedule::At { at_ms: 42 };
    assert_eq!(compute_next_run_at_ms(&schedule, None, 1_000_000).unwrap(), 42);
}

#[test]
fn cron_schedule_resolves_the_next_fire_in_the_given_time_zone() {
    let schedule = Schedule::Cron { expr: "0 0 * * * * *".into(), tz: "UTC".into() };
    // 2024-01-01T00:00:30Z
    let after_ms = 1_704_067_230_000;
    let next = compute_next_run_at_ms(&schedule, None, after_ms).unwrap();
    assert!(next > after_ms);
}

#[test]
fn cron_schedule_rejects_an_unknown_time_zone() {
    let schedule = Schedule::Cron { expr: "0 0 * * * * *".into(), tz: "Not/AZone".into() };
    assert!(compute_next_run_at_ms(&schedule, None, 0).is_err());
}
