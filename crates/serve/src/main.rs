// SPDX-License-Identifier: MIT

//! `foreman-serve`: the background server binary. Holds the workspace
//! writer lock, serves the HTTP control plane, and exits on `SIGINT`,
//! `SIGTERM`, or a `POST /api/server/shutdown`.
//!
//! Real LLM-provider and coding-agent backends are injected by embedders;
//! this binary wires up the mock backends so the process is runnable
//! standalone for development and the end-to-end test scenarios.

use clap::Parser;
use foreman_broker::{AuditLog, MockOperatorBackend, OperatorBroker};
use foreman_core::{Clock, SystemClock};
use foreman_runner::MockBackendRunner;
use foreman_scheduler::SchedulerController;
use foreman_serve::http::{router, AppState};
use foreman_serve::{ServeResult, WorkspaceConfig, WriterLock};
use foreman_store::{StorePaths, WorkspaceStore};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "foreman-serve", about = "Background server for a foreman workspace store")]
struct Args {
    /// Repository root containing the workspace store.
    #[arg(long, default_value = ".")]
    repo_root: std::path::PathBuf,

    /// TCP port to bind. 0 picks an ephemeral port.
    #[arg(long, default_value_t = 0)]
    port: u16,
}

/// Initializes the global subscriber. Returns a guard that must stay alive
/// for the process lifetime when logging to a file — dropping it early
/// stops the background writer thread mid-flush.
#[must_use]
fn init_logging(paths: &StorePaths) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::io::stderr().is_terminal() {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        None
    } else {
        let logs_dir = paths.logs_dir();
        let _ = std::fs::create_dir_all(&logs_dir);
        let appender = tracing_appender::rolling::daily(logs_dir, "foreman-serve.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).with_ansi(false).init();
        Some(guard)
    }
}

#[tokio::main]
async fn main() -> ServeResult<()> {
    let args = Args::parse();
    let paths = StorePaths::new(&args.repo_root);
    let _logging_guard = init_logging(&paths);

    match run(&args, &paths).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            tracing::error!(%err, "foreman-serve exited with an error");
            Err(err)
        }
    }
}

async fn run(args: &Args, paths: &StorePaths) -> ServeResult<i32> {
    let lock = WriterLock::acquire(paths.writer_lock_file())?;

    let result = serve(args, paths).await;
    drop(lock);
    result
}

async fn serve(args: &Args, paths: &StorePaths) -> ServeResult<i32> {
    let config = WorkspaceConfig::load_layered(&args.repo_root, paths.config_file())?;

    let backend = Arc::new(MockBackendRunner::new());
    let store = Arc::new(WorkspaceStore::<SystemClock>::open(&args.repo_root)?);
    let scheduler = Arc::new(SchedulerController::open(paths, store.clone(), backend.clone())?);

    let audit = AuditLog::open(paths.operator_turns_log())?;
    let _broker = Arc::new(OperatorBroker::new(
        config.operator.clone().into_broker_config(),
        Arc::new(MockOperatorBackend::new()),
        Arc::new(foreman_broker::DefaultContextResolver::new()),
        audit,
        SystemClock,
    ));

    let shutdown = Arc::new(Notify::new());
    let state = Arc::new(AppState {
        scheduler: scheduler.clone(),
        run_defaults: config.run_defaults.clone(),
        started_at: Instant::now(),
        shutdown: shutdown.clone(),
    });
    let app = router(state, std::time::Duration::from_secs(10));

    let listener = TcpListener::bind(("127.0.0.1", args.port)).await?;
    let bound_addr = listener.local_addr()?;
    let url = format!("http://{bound_addr}");

    foreman_serve::probe::publish(paths.server_discovery_file(), std::process::id(), bound_addr.port(), &url)?;
    tracing::info!(%url, "foreman-serve listening");

    let tick_shutdown = shutdown.clone();
    let tick_task = tokio::spawn(tick_loop(scheduler, tick_shutdown));

    let exit_code = tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown(shutdown)) => {
            if let Err(err) = result {
                tracing::error!(%err, "http server exited with an error");
            }
            0
        }
        signo = foreman_serve::signal::wait_for_signal() => signo,
    };

    tick_task.abort();
    let _ = std::fs::remove_file(paths.server_discovery_file());
    Ok(exit_code)
}

/// Drives the queued-run, heartbeat, and cron tick loops until shutdown.
async fn tick_loop(scheduler: Arc<SchedulerController<SystemClock>>, shutdown: Arc<Notify>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = scheduler.tick_queue().await {
                    tracing::warn!(%err, "queue tick failed");
                }
                let now_ms = SystemClock.epoch_ms();
                if let Err(err) = scheduler.tick_heartbeats(now_ms) {
                    tracing::warn!(%err, "heartbeat tick failed");
                }
                if let Err(err) = scheduler.tick_cron(now_ms) {
                    tracing::warn!(%err, "cron tick failed");
                }
            }
            _ = shutdown.notified() => break,
        }
    }
}

async fn wait_for_shutdown(shutdown: Arc<Notify>) {
    shutdown.notified().await;
}
