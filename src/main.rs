//! Command-line entry point for the Stellar background jobs.
//!
//! Usage:
//!
//! ```text
//! stellar-jobs --config stellar-jobs.toml tick
//! stellar-jobs --config stellar-jobs.toml provision
//! stellar-jobs --config stellar-jobs.toml tasks toggle prune-sessions
//! stellar-jobs --config stellar-jobs.toml resources approve <id> --approver admin
//! ```
//!
//! `tick` is meant to be invoked once per tick window by an external trigger
//! such as cron or a systemd timer.

use clap::{Parser, Subcommand};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{WrapErr, bail};
use mockable::DefaultClock;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use stellar_jobs::config::StellarJobsConfig;
use stellar_jobs::resource::{
    adapters::postgres::{PostgresResourceRepository, ResourcePgPool},
    domain::{ActorRef, Resource, ResourceId},
    services::{ApprovalGate, ResourceEvents},
};
use stellar_jobs::schedule::{
    adapters::postgres::{PostgresScheduledTaskRepository, PostgresTaskLock, SchedulePgPool},
    domain::{ScheduledTask, TaskName},
    services::{TaskRegistryService, TaskScheduler, TaskTickOutcome},
};
use stellar_jobs::telemetry;
use tracing::{info, warn};
use uuid::Uuid;

type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Parser, Debug)]
#[command(name = "stellar-jobs", version, about = "Stellar background jobs")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "stellar-jobs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs one scheduler tick and dispatches due tasks.
    Tick,
    /// Creates or refreshes the tasks listed in the configuration.
    Provision,
    /// Lists and switches scheduled tasks.
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Reviews generated resources.
    Resources {
        #[command(subcommand)]
        action: ResourceAction,
    },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    /// Lists every task with its state.
    List,
    /// Enables a task.
    Enable { name: String },
    /// Disables a task.
    Disable { name: String },
    /// Flips a task's enabled flag.
    Toggle { name: String },
}

#[derive(Subcommand, Debug)]
enum ResourceAction {
    /// Lists resources awaiting review.
    Pending,
    /// Approves a pending resource.
    Approve {
        id: Uuid,
        #[arg(long)]
        approver: String,
    },
    /// Rejects a pending resource.
    Reject {
        id: Uuid,
        #[arg(long)]
        approver: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    telemetry::init().wrap_err("failed to install tracing subscriber")?;

    let config = StellarJobsConfig::load(&cli.config)
        .wrap_err_with(|| format!("failed to load {}", cli.config.display()))?;
    let pool = connect(&config).await?;
    let clock = Arc::new(DefaultClock);

    match cli.command {
        Command::Tick => run_tick(&config, pool, clock).await,
        Command::Provision => run_provision(&config, pool, clock).await,
        Command::Tasks { action } => run_task_action(action, pool, clock).await,
        Command::Resources { action } => run_resource_action(action, pool, clock).await,
    }
}

async fn connect(config: &StellarJobsConfig) -> eyre::Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url()?);
    tokio::task::spawn_blocking(move || Pool::builder().build(manager))
        .await
        .wrap_err("connection pool task panicked")?
        .wrap_err("failed to connect to PostgreSQL")
}

async fn run_tick(
    config: &StellarJobsConfig,
    pool: SchedulePgPool,
    clock: Arc<DefaultClock>,
) -> eyre::Result<()> {
    let scheduler = TaskScheduler::new(
        Arc::new(PostgresScheduledTaskRepository::new(pool.clone())),
        Arc::new(PostgresTaskLock::new(pool)),
        Arc::new(config.command_registry()),
        clock,
        config.scheduler_settings()?,
    );
    let report = scheduler.tick().await?;
    for (task, outcome) in report.outcomes() {
        if let TaskTickOutcome::Failed(message) = outcome {
            warn!(task = %task, error = %message, "task failed during tick");
        }
    }
    info!(
        window_start = %report.window().start(),
        considered = report.outcomes().len(),
        dispatched = report.dispatched().len(),
        failed = report.failure_count(),
        "tick finished"
    );
    if report.failure_count() > 0 {
        bail!("{} task(s) failed during the tick", report.failure_count());
    }
    Ok(())
}

async fn run_provision(
    config: &StellarJobsConfig,
    pool: SchedulePgPool,
    clock: Arc<DefaultClock>,
) -> eyre::Result<()> {
    let registry = TaskRegistryService::new(
        Arc::new(PostgresScheduledTaskRepository::new(pool)),
        clock,
    );
    let commands = config.command_registry();
    for definition in &config.tasks {
        if !commands.contains(definition.command()) {
            warn!(
                task = %definition.name(),
                command = %definition.command(),
                "no program configured for command, dispatch will fail"
            );
        }
        let (task, outcome) = registry.provision(definition.clone()).await?;
        info!(task = %task.name(), outcome = ?outcome, "task provisioned");
    }
    Ok(())
}

async fn run_task_action(
    action: TaskAction,
    pool: SchedulePgPool,
    clock: Arc<DefaultClock>,
) -> eyre::Result<()> {
    let registry = TaskRegistryService::new(
        Arc::new(PostgresScheduledTaskRepository::new(pool)),
        clock,
    );
    let tasks = match action {
        TaskAction::List => registry.list_all().await?,
        TaskAction::Enable { name } => vec![registry.enable(&TaskName::new(name)?).await?],
        TaskAction::Disable { name } => vec![registry.disable(&TaskName::new(name)?).await?],
        TaskAction::Toggle { name } => vec![registry.toggle(&TaskName::new(name)?).await?],
    };
    let mut out = std::io::stdout().lock();
    for task in &tasks {
        writeln!(out, "{}", describe_task(task))?;
    }
    Ok(())
}

async fn run_resource_action(
    action: ResourceAction,
    pool: ResourcePgPool,
    clock: Arc<DefaultClock>,
) -> eyre::Result<()> {
    let gate = ApprovalGate::new(
        Arc::new(PostgresResourceRepository::new(pool)),
        ResourceEvents::new(),
        clock,
    );
    let resources = match action {
        ResourceAction::Pending => gate.pending_queue().await?,
        ResourceAction::Approve { id, approver } => vec![
            gate.approve(ResourceId::from_uuid(id), ActorRef::new(approver)?)
                .await?,
        ],
        ResourceAction::Reject {
            id,
            approver,
            reason,
        } => vec![
            gate.reject(ResourceId::from_uuid(id), ActorRef::new(approver)?, reason)
                .await?,
        ],
    };
    let mut out = std::io::stdout().lock();
    for resource in &resources {
        writeln!(out, "{}", describe_resource(resource))?;
    }
    Ok(())
}

fn describe_task(task: &ScheduledTask) -> String {
    let state = if task.is_enabled() { "enabled" } else { "disabled" };
    let last_run = task
        .last_run_at()
        .map_or_else(|| "never".to_owned(), |at| at.to_rfc3339());
    format!(
        "{}\t{}\t{}\t{}\tlast run {}",
        task.name(),
        state,
        task.schedule(),
        task.command(),
        last_run
    )
}

fn describe_resource(resource: &Resource) -> String {
    let artifact = resource
        .artifact_path()
        .map_or("-", |path| path.as_str());
    format!(
        "{}\t{}\t{}\t{}\tattempts {}",
        resource.id(),
        resource.kind(),
        resource.status(),
        artifact,
        resource.attempts().len()
    )
}
