// SPDX-License-Identifier: MIT

//! `fm`: the foreman workspace CLI.

mod client;
mod color;
mod commands;
mod env;
mod error;
mod output;
mod store_ctx;

use clap::{Parser, Subcommand};
use commands::control::ControlArgs;
use commands::cron::CronArgs;
use commands::events::EventsArgs;
use commands::forum::ForumArgs;
use commands::heartbeats::HeartbeatsArgs;
use commands::issues::IssuesArgs;
use commands::replay::ReplayArgs;
use commands::resume::ResumeArgs;
use commands::run::RunArgs;
use commands::runs::RunsArgs;
use commands::serve::ServeArgs;
use commands::session::SessionArgs;
use commands::stop::StopArgs;
use commands::store::StoreArgs;
use error::CliError;
use output::OutputFormat;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fm", about = "CLI for a foreman workspace", version)]
struct Cli {
    /// Repository root containing the workspace store
    #[arg(long, global = true, default_value = ".")]
    repo_root: PathBuf,
    /// Emit structured JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Emit pretty-printed JSON (implies --json)
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repo + DAG summary
    Status,
    /// Issue operations
    Issues(IssuesArgs),
    /// Forum operations
    Forum(ForumArgs),
    /// Event queries
    Events(EventsArgs),
    /// Queue a run
    Run(RunArgs),
    /// Reset + re-enter the runner for a root issue
    Resume(ResumeArgs),
    /// Queued-run queries
    Runs(RunsArgs),
    /// Heartbeat programs
    Heartbeats(HeartbeatsArgs),
    /// Cron programs
    Cron(CronArgs),
    /// Operator-session management
    Session(SessionArgs),
    /// Start the background server
    Serve(ServeArgs),
    /// Graceful shutdown
    Stop(StopArgs),
    /// Inspect store files
    Store(StoreArgs),
    /// Emit a trace log
    Replay(ReplayArgs),
    /// Identity + operator config
    Control(ControlArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let format = OutputFormat::from_flags(cli.json, cli.pretty);

    let result = dispatch(&cli.repo_root, cli.command, format).await;

    match result {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            report_error(&err, format);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

async fn dispatch(repo_root: &std::path::Path, command: Commands, format: OutputFormat) -> Result<(), CliError> {
    match command {
        Commands::Status => commands::status::status(repo_root, format),
        Commands::Issues(args) => commands::issues::run(repo_root, args, format),
        Commands::Forum(args) => commands::forum::run(repo_root, args, format),
        Commands::Events(args) => commands::events::run(repo_root, args, format),
        Commands::Run(args) => commands::run::run(repo_root, args, format).await,
        Commands::Resume(args) => commands::resume::run(repo_root, args, format).await,
        Commands::Runs(args) => commands::runs::run(repo_root, args, format).await,
        Commands::Heartbeats(args) => commands::heartbeats::run(repo_root, args, format).await,
        Commands::Cron(args) => commands::cron::run(repo_root, args, format).await,
        Commands::Session(args) => commands::session::run(repo_root, args, format).await,
        Commands::Serve(args) => commands::serve::run(repo_root, args, format).await,
        Commands::Stop(args) => commands::stop::run(repo_root, args, format).await,
        Commands::Store(args) => commands::store::run(repo_root, args, format),
        Commands::Replay(args) => commands::replay::run(repo_root, args, format),
        Commands::Control(args) => commands::control::run(repo_root, args, format).await,
    }
}

fn report_error(err: &CliError, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "error": err.message });
            println!("{}", body);
        }
        OutputFormat::Text => {
            if std::io::stderr().is_terminal() {
                eprintln!("{} {}", color::header("error:"), err.message);
            } else {
                eprintln!("error: {}", err.message);
            }
            if !err.hints.is_empty() {
                eprintln!("Try: {}", err.hints.join(" | "));
            }
        }
    }
}
