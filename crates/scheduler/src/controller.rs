// SPDX-License-Identifier: MIT

//! The scheduled-run controller: the queued-run journal, the heartbeat and
//! cron registries, and the tick loops that drive them over a [`DagRunner`].

use crate::cron::{compute_next_run_at_ms, CronLogRecord, CronProgram, Schedule};
use crate::error::{SchedulerError, SchedulerResult};
use crate::heartbeat::{HeartbeatLogRecord, HeartbeatProgram, Target, WakeMode};
use crate::queued_run::{QueuedRun, RunJournalRecord, RunSource, RunStatus};
use crate::tail_capture::TailCapture;
use foreman_core::{Clock, ProgramId, RunId, SystemClock};
use foreman_runner::{BackendRunner, DagRunner, RunExit, RunnerHooks};
use foreman_store::issue::well_known_tags;
use foreman_store::{AppendLog, CreateIssueInput, EventQuery, StorePaths, WorkspaceStore};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Summary returned by `cron.status`.
#[derive(Debug, Clone)]
pub struct CronStatus {
    pub count: usize,
    pub enabled_count: usize,
    pub armed_count: usize,
    pub armed: Vec<(ProgramId, u64)>,
}

/// Fields that may be patched by `update_heartbeat`. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatPatch {
    pub title: Option<String>,
    pub enabled: Option<bool>,
    pub every_ms: Option<u64>,
}

/// Fields that may be patched by `update_cron`. `None` leaves the field
/// untouched. Setting `schedule` recomputes `next_run_at_ms` from the new
/// schedule as of the patch time, discarding any previous fire history.
#[derive(Debug, Clone, Default)]
pub struct CronPatch {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub enabled: Option<bool>,
    pub schedule: Option<Schedule>,
}

pub struct SchedulerController<C: Clock = SystemClock> {
    store: Arc<WorkspaceStore<C>>,
    backend: Arc<dyn BackendRunner>,
    runs_log: Mutex<AppendLog>,
    runs: RwLock<BTreeMap<RunId, QueuedRun>>,
    heartbeats_log: Mutex<AppendLog>,
    heartbeats: RwLock<BTreeMap<ProgramId, HeartbeatProgram>>,
    cron_log: Mutex<AppendLog>,
    cron: RwLock<BTreeMap<ProgramId, CronProgram>>,
}

impl<C: Clock> SchedulerController<C> {
    /// Open the controller's three journals under `paths`, replaying each
    /// into its in-memory registry.
    pub fn open(paths: &StorePaths, store: Arc<WorkspaceStore<C>>, backend: Arc<dyn BackendRunner>) -> SchedulerResult<Self> {
        let run_records: Vec<RunJournalRecord> = AppendLog::read_all(paths.queued_runs_log())?;
        let mut runs = BTreeMap::new();
        for record in run_records {
            let run = record.run().clone();
            runs.insert(run.job_id, run);
        }

        let heartbeat_records: Vec<HeartbeatLogRecord> = AppendLog::read_all(paths.heartbeats_log())?;
        let mut heartbeats = BTreeMap::new();
        for record in heartbeat_records {
            match record {
                HeartbeatLogRecord::Created { program, .. } | HeartbeatLogRecord::Updated { program, .. } => {
                    heartbeats.insert(program.program_id, program);
                }
                HeartbeatLogRecord::Deleted { program_id, .. } => {
                    heartbeats.remove(&program_id);
                }
            }
        }

        let cron_records: Vec<CronLogRecord> = AppendLog::read_all(paths.cron_log())?;
        let mut cron = BTreeMap::new();
        for record in cron_records {
            match record {
                CronLogRecord::Created { program, .. } | CronLogRecord::Updated { program, .. } => {
                    cron.insert(program.program_id, program);
                }
                CronLogRecord::Deleted { program_id, .. } => {
                    cron.remove(&program_id);
                }
            }
        }

        Ok(Self {
            store,
            backend,
            runs_log: Mutex::new(AppendLog::open(paths.queued_runs_log())?),
            runs: RwLock::new(runs),
            heartbeats_log: Mutex::new(AppendLog::open(paths.heartbeats_log())?),
            heartbeats: RwLock::new(heartbeats),
            cron_log: Mutex::new(AppendLog::open(paths.cron_log())?),
            cron: RwLock::new(cron),
        })
    }

    fn now_ms(&self) -> u64 {
        self.store.clock().epoch_ms()
    }

    // ---- queued runs ----------------------------------------------------

    pub fn enqueue_run(&self, prompt: String, max_steps: u32, mode: String, source: RunSource) -> SchedulerResult<QueuedRun> {
        let run = QueuedRun::new(prompt, max_steps, mode, source, self.now_ms());
        self.persist_run(RunJournalRecord::Created { run: run.clone(), ts_ms: run.started_at_ms })?;
        self.runs.write().insert(run.job_id, run.clone());
        Ok(run)
    }

    fn persist_run(&self, record: RunJournalRecord) -> SchedulerResult<()> {
        self.runs_log.lock().append(&record)?;
        Ok(())
    }

    pub fn get_run(&self, job_id: &str) -> SchedulerResult<QueuedRun> {
        let job_id: RunId = job_id.parse().map_err(|_| SchedulerError::NotFound(job_id.to_string()))?;
        self.runs.read().get(&job_id).cloned().ok_or_else(|| SchedulerError::NotFound(job_id.to_string()))
    }

    pub fn list_runs(&self) -> Vec<QueuedRun> {
        let mut out: Vec<QueuedRun> = self.runs.read().values().cloned().collect();
        out.sort_by_key(|r| r.started_at_ms);
        out
    }

    /// The event trail for a queued run's root issue, if one has been
    /// assigned yet.
    pub fn trace_run(&self, job_id: &str) -> SchedulerResult<Vec<foreman_store::EventRecord>> {
        let run = self.get_run(job_id)?;
        let Some(root) = run.root_issue_id else { return Ok(Vec::new()) };
        let query = EventQuery { issue_id: Some(root), ..Default::default() };
        Ok(self.store.query_events(query))
    }

    /// Advance the oldest queued job by one full [`DagRunner`] invocation.
    /// Returns the job id it acted on, if any job was queued.
    pub async fn tick_queue(&self) -> SchedulerResult<Option<RunId>> {
        let Some(mut run) = self.next_queued_run() else { return Ok(None) };

        let now = self.now_ms();
        run.status = RunStatus::Running;
        run.updated_at_ms = now;
        self.persist_run(RunJournalRecord::Updated { run: run.clone(), ts_ms: now })?;
        self.runs.write().insert(run.job_id, run.clone());

        let root_issue_id = match run.root_issue_id {
            Some(id) => id,
            None => {
                let tags = [well_known_tags::NODE_ROOT, well_known_tags::NODE_AGENT]
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                let issue = self.store.create(run.prompt.clone(), CreateIssueInput { tags, ..Default::default() })?;
                issue.id
            }
        };
        run.root_issue_id = Some(root_issue_id);

        let tails = Arc::new(TailCapture::default());
        let hooks: Arc<dyn RunnerHooks> = tails.clone();
        let runner = DagRunner::new(Arc::clone(&self.store), Arc::clone(&self.backend)).with_hooks(hooks);
        let outcome = runner.run(root_issue_id.as_str(), run.max_steps).await;

        let finished = self.now_ms();
        run.finished_at_ms = Some(finished);
        run.updated_at_ms = finished;
        run.last_progress = tails.last_progress();
        QueuedRun::push_tail(&mut run.stdout_tail, tails.lines());

        match outcome {
            Ok(RunExit::RootFinal) | Ok(RunExit::MaxStepsReached) => {
                run.status = RunStatus::Succeeded;
                run.exit_code = Some(0);
            }
            Ok(RunExit::Deadlock { reason }) => {
                run.status = RunStatus::Failed;
                run.exit_code = Some(1);
                run.last_progress = Some(reason);
            }
            Err(err) => {
                run.status = RunStatus::Failed;
                run.exit_code = Some(1);
                run.last_progress = Some(err.to_string());
            }
        }

        self.persist_run(RunJournalRecord::Updated { run: run.clone(), ts_ms: finished })?;
        let job_id = run.job_id;
        self.runs.write().insert(job_id, run);
        Ok(Some(job_id))
    }

    fn next_queued_run(&self) -> Option<QueuedRun> {
        self.runs.read().values().filter(|r| r.status == RunStatus::Queued).min_by_key(|r| r.started_at_ms).cloned()
    }

    // ---- heartbeats -------------------------------------------------------

    pub fn create_heartbeat(&self, title: String, target: Target, every_ms: u64, wake_mode: WakeMode) -> SchedulerResult<HeartbeatProgram> {
        let program = HeartbeatProgram::new(title, target, every_ms, wake_mode, self.now_ms());
        self.heartbeats_log.lock().append(&HeartbeatLogRecord::Created { program: program.clone(), ts_ms: program.updated_at_ms })?;
        self.heartbeats.write().insert(program.program_id, program.clone());
        Ok(program)
    }

    pub fn get_heartbeat(&self, program_id: &str) -> SchedulerResult<HeartbeatProgram> {
        let program_id: ProgramId = program_id.parse().map_err(|_| SchedulerError::NotFound(program_id.to_string()))?;
        self.heartbeats.read().get(&program_id).cloned().ok_or_else(|| SchedulerError::NotFound(program_id.to_string()))
    }

    pub fn list_heartbeats(&self) -> Vec<HeartbeatProgram> {
        self.heartbeats.read().values().cloned().collect()
    }

    pub fn delete_heartbeat(&self, program_id: &str) -> SchedulerResult<()> {
        let program = self.get_heartbeat(program_id)?;
        self.heartbeats_log.lock().append(&HeartbeatLogRecord::Deleted { program_id: program.program_id, ts_ms: self.now_ms() })?;
        self.heartbeats.write().remove(&program.program_id);
        Ok(())
    }

    fn save_heartbeat(&self, program: HeartbeatProgram) -> SchedulerResult<()> {
        self.heartbeats_log.lock().append(&HeartbeatLogRecord::Updated { program: program.clone(), ts_ms: program.updated_at_ms })?;
        self.heartbeats.write().insert(program.program_id, program);
        Ok(())
    }

    pub fn update_heartbeat(&self, program_id: &str, patch: HeartbeatPatch) -> SchedulerResult<HeartbeatProgram> {
        let mut program = self.get_heartbeat(program_id)?;
        if let Some(title) = patch.title {
            program.title = title;
        }
        if let Some(enabled) = patch.enabled {
            program.enabled = enabled;
        }
        if let Some(every_ms) = patch.every_ms {
            program.every_ms = every_ms;
        }
        program.updated_at_ms = self.now_ms();
        self.save_heartbeat(program.clone())?;
        Ok(program)
    }

    /// Fire every enabled heartbeat whose `next_trigger_at_ms` has passed.
    /// Returns the ids triggered this tick.
    pub fn tick_heartbeats(&self, now_ms: u64) -> SchedulerResult<Vec<ProgramId>> {
        let due: Vec<HeartbeatProgram> =
            self.heartbeats.read().values().filter(|p| p.enabled && p.next_trigger_at_ms <= now_ms).cloned().collect();

        let mut fired = Vec::new();
        for mut program in due {
            let result = self.nudge_target(&program.target);
            program.last_triggered_at_ms = Some(now_ms);
            program.last_result = Some(if result.is_ok() { "ok".to_string() } else { "error".to_string() });
            program.reason = result.err().map(|e: SchedulerError| e.to_string());
            program.next_trigger_at_ms = now_ms + program.every_ms;
            program.updated_at_ms = now_ms;

            if program.auto_disable_on_terminal() && self.target_is_terminal(&program.target)? {
                program.enabled = false;
            }

            fired.push(program.program_id);
            self.save_heartbeat(program)?;
        }
        Ok(fired)
    }

    fn nudge_target(&self, target: &Target) -> SchedulerResult<()> {
        match target {
            Target::Run { job_id: Some(job_id), .. } => {
                let run = self.get_run(job_id.as_str())?;
                if run.status == RunStatus::Queued || run.status == RunStatus::Running {
                    return Ok(());
                }
                Err(SchedulerError::InvalidInput(format!("run {job_id} is not active")))
            }
            Target::Run { job_id: None, root_issue_id: Some(root) } => {
                self.store.get(root.as_str())?;
                Ok(())
            }
            Target::Run { job_id: None, root_issue_id: None } => {
                Err(SchedulerError::InvalidInput("heartbeat target names no job or root issue".to_string()))
            }
        }
    }

    fn target_is_terminal(&self, target: &Target) -> SchedulerResult<bool> {
        match target {
            Target::Run { job_id: Some(job_id), .. } => Ok(self.get_run(job_id.as_str())?.status.is_terminal()),
            Target::Run { root_issue_id: Some(root), .. } => Ok(self.store.validate(root.as_str())?.is_final),
            Target::Run { job_id: None, root_issue_id: None } => Ok(false),
        }
    }

    // ---- cron ---------------------------------------------------------

    pub fn create_cron(&self, title: String, prompt: String, schedule: Schedule) -> SchedulerResult<CronProgram> {
        let program = CronProgram::new(title, prompt, schedule, self.now_ms())?;
        self.cron_log.lock().append(&CronLogRecord::Created { program: program.clone(), ts_ms: program.updated_at_ms })?;
        self.cron.write().insert(program.program_id, program.clone());
        Ok(program)
    }

    pub fn get_cron(&self, program_id: &str) -> SchedulerResult<CronProgram> {
        let program_id: ProgramId = program_id.parse().map_err(|_| SchedulerError::NotFound(program_id.to_string()))?;
        self.cron.read().get(&program_id).cloned().ok_or_else(|| SchedulerError::NotFound(program_id.to_string()))
    }

    pub fn list_cron(&self) -> Vec<CronProgram> {
        self.cron.read().values().cloned().collect()
    }

    pub fn delete_cron(&self, program_id: &str) -> SchedulerResult<()> {
        let program = self.get_cron(program_id)?;
        self.cron_log.lock().append(&CronLogRecord::Deleted { program_id: program.program_id, ts_ms: self.now_ms() })?;
        self.cron.write().remove(&program.program_id);
        Ok(())
    }

    fn save_cron(&self, program: CronProgram) -> SchedulerResult<()> {
        self.cron_log.lock().append(&CronLogRecord::Updated { program: program.clone(), ts_ms: program.updated_at_ms })?;
        self.cron.write().insert(program.program_id, program);
        Ok(())
    }

    pub fn update_cron(&self, program_id: &str, patch: CronPatch) -> SchedulerResult<CronProgram> {
        let mut program = self.get_cron(program_id)?;
        if let Some(title) = patch.title {
            program.title = title;
        }
        if let Some(prompt) = patch.prompt {
            program.prompt = prompt;
        }
        if let Some(enabled) = patch.enabled {
            program.enabled = enabled;
        }
        if let Some(schedule) = patch.schedule {
            program.next_run_at_ms = compute_next_run_at_ms(&schedule, None, self.now_ms())?;
            program.schedule = schedule;
        }
        program.updated_at_ms = self.now_ms();
        self.save_cron(program.clone())?;
        Ok(program)
    }

    pub fn cron_status(&self) -> CronStatus {
        let cron = self.cron.read();
        let count = cron.len();
        let enabled_count = cron.values().filter(|p| p.enabled).count();
        let armed: Vec<(ProgramId, u64)> = cron.values().filter(|p| p.enabled).map(|p| (p.program_id, p.next_run_at_ms)).collect();
        CronStatus { count, enabled_count, armed_count: armed.len(), armed }
    }

    /// Enqueue a run for every enabled cron program whose `next_run_at_ms`
    /// has passed, advancing its schedule. A one-shot `At` schedule
    /// disables itself once it fires.
    pub fn tick_cron(&self, now_ms: u64) -> SchedulerResult<Vec<RunId>> {
        let due: Vec<CronProgram> = self.cron.read().values().filter(|p| p.enabled && p.next_run_at_ms <= now_ms).cloned().collect();

        let mut fired = Vec::new();
        for mut program in due {
            let run =
                self.enqueue_run(program.prompt.clone(), crate::queued_run::DEFAULT_MAX_STEPS, "cron".to_string(), RunSource::Cron)?;
            fired.push(run.job_id);

            program.last_triggered_at_ms = Some(now_ms);
            program.last_result = Some("ok".to_string());

            if matches!(program.schedule, Schedule::At { .. }) {
                program.enabled = false;
            } else {
                match compute_next_run_at_ms(&program.schedule, Some(program.next_run_at_ms), now_ms) {
                    Ok(next) => program.next_run_at_ms = next,
                    Err(err) => {
                        program.last_result = Some("error".to_string());
                        program.reason = Some(err.to_string());
                        program.enabled = false;
                    }
                }
            }
            program.updated_at_ms = now_ms;
            self.save_cron(program)?;
        }
        Ok(fired)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
