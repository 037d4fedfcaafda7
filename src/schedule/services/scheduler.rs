//! Tick-driven dispatch of due scheduled tasks.

use crate::schedule::{
    domain::{LockOwner, ScheduledTask, TaskLease, TaskName, TickWindow},
    ports::{
        CommandDispatcher, ScheduledTaskRepository, ScheduledTaskRepositoryError,
        TaskLockProvider,
    },
};
use chrono::TimeDelta;
use futures::future::join_all;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Scheduler tuning values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    tick_window: TimeDelta,
    lease_ttl: TimeDelta,
    owner: LockOwner,
}

impl SchedulerSettings {
    /// Default tick window: one cron minute.
    pub const DEFAULT_TICK_WINDOW: TimeDelta = TimeDelta::seconds(60);
    /// Default lease lifetime before a crashed holder's lease is reclaimable.
    pub const DEFAULT_LEASE_TTL: TimeDelta = TimeDelta::seconds(600);

    /// Creates settings with default window and lease lifetime.
    #[must_use]
    pub const fn new(owner: LockOwner) -> Self {
        Self {
            tick_window: Self::DEFAULT_TICK_WINDOW,
            lease_ttl: Self::DEFAULT_LEASE_TTL,
            owner,
        }
    }

    /// Sets the tick window length.
    #[must_use]
    pub const fn with_tick_window(mut self, tick_window: TimeDelta) -> Self {
        self.tick_window = tick_window;
        self
    }

    /// Sets the lease lifetime.
    #[must_use]
    pub const fn with_lease_ttl(mut self, lease_ttl: TimeDelta) -> Self {
        self.lease_ttl = lease_ttl;
        self
    }

    /// Returns the tick window length.
    #[must_use]
    pub const fn tick_window(&self) -> TimeDelta {
        self.tick_window
    }

    /// Returns the lease lifetime.
    #[must_use]
    pub const fn lease_ttl(&self) -> TimeDelta {
        self.lease_ttl
    }

    /// Returns the lock owner identity.
    #[must_use]
    pub const fn owner(&self) -> &LockOwner {
        &self.owner
    }
}

/// What happened to one enabled task during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTickOutcome {
    /// The schedule does not fire in the current window, or the task was
    /// disabled after the listing was taken.
    NotDue,
    /// The task already ran in the current window.
    AlreadyRan,
    /// Another scheduler holds the task's lease; the task was skipped.
    Overlapping,
    /// The command was dispatched and completed.
    Dispatched,
    /// Dispatch or bookkeeping failed with the given message.
    Failed(String),
}

/// Per-task outcomes of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    window: TickWindow,
    outcomes: Vec<(TaskName, TaskTickOutcome)>,
}

impl TickReport {
    /// Returns the window the tick evaluated.
    #[must_use]
    pub const fn window(&self) -> &TickWindow {
        &self.window
    }

    /// Returns outcomes in task-name order.
    #[must_use]
    pub fn outcomes(&self) -> &[(TaskName, TaskTickOutcome)] {
        &self.outcomes
    }

    /// Returns the outcome recorded for `name`, if the task was considered.
    #[must_use]
    pub fn outcome_for(&self, name: &TaskName) -> Option<&TaskTickOutcome> {
        self.outcomes
            .iter()
            .find(|(task, _)| task == name)
            .map(|(_, outcome)| outcome)
    }

    /// Returns the names of tasks whose command was dispatched, including
    /// dispatches that failed.
    #[must_use]
    pub fn dispatched(&self) -> Vec<&TaskName> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| {
                matches!(
                    outcome,
                    TaskTickOutcome::Dispatched | TaskTickOutcome::Failed(_)
                )
            })
            .map(|(task, _)| task)
            .collect()
    }

    /// Returns the number of tasks that reported a failure.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TaskTickOutcome::Failed(_)))
            .count()
    }
}

/// Errors that abort a whole tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Listing enabled tasks failed.
    #[error(transparent)]
    Repository(#[from] ScheduledTaskRepositoryError),
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Dispatches each due task at most once per tick window.
///
/// The scheduler owns no timer; an external trigger calls [`Self::tick`]
/// once per interval.
#[derive(Clone)]
pub struct TaskScheduler<R, L, D, C>
where
    R: ScheduledTaskRepository,
    L: TaskLockProvider,
    D: CommandDispatcher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    lock: Arc<L>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    settings: SchedulerSettings,
}

impl<R, L, D, C> TaskScheduler<R, L, D, C>
where
    R: ScheduledTaskRepository,
    L: TaskLockProvider,
    D: CommandDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler from its collaborators.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        lock: Arc<L>,
        dispatcher: Arc<D>,
        clock: Arc<C>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            repository,
            lock,
            dispatcher,
            clock,
            settings,
        }
    }

    /// Returns the scheduler settings.
    #[must_use]
    pub const fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Evaluates every enabled task against the current window.
    ///
    /// Tasks are processed concurrently. A failing task is reported in the
    /// returned [`TickReport`] and never prevents the others from running.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Repository`] when the enabled tasks cannot
    /// be listed.
    pub async fn tick(&self) -> SchedulerResult<TickReport> {
        let now = self.clock.utc();
        let window = TickWindow::containing(now, self.settings.tick_window);
        let tasks = self.repository.find_enabled().await?;
        debug!(
            window_start = %window.start(),
            candidates = tasks.len(),
            "scheduler tick"
        );

        let outcomes = join_all(tasks.iter().map(|task| self.evaluate(task, &window))).await;
        let report = TickReport {
            window,
            outcomes: tasks
                .into_iter()
                .map(|task| task.name().clone())
                .zip(outcomes)
                .collect(),
        };
        info!(
            window_start = %window.start(),
            dispatched = report.dispatched().len(),
            failed = report.failure_count(),
            "scheduler tick finished"
        );
        Ok(report)
    }

    async fn evaluate(&self, task: &ScheduledTask, window: &TickWindow) -> TaskTickOutcome {
        if !task.schedule().matches(window) {
            return TaskTickOutcome::NotDue;
        }

        let lease = match self
            .lock
            .try_acquire(
                task.name(),
                &self.settings.owner,
                self.clock.utc(),
                self.settings.lease_ttl,
            )
            .await
        {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                info!(task = %task.name(), "task lease held elsewhere, skipping overlapping run");
                return TaskTickOutcome::Overlapping;
            }
            Err(err) => {
                error!(task = %task.name(), error = %err, "failed to acquire task lease");
                return TaskTickOutcome::Failed(err.to_string());
            }
        };

        let outcome = self.run_leased(task.name(), window).await;
        self.release(&lease).await;
        outcome
    }

    async fn run_leased(&self, name: &TaskName, window: &TickWindow) -> TaskTickOutcome {
        let mut current = match self.repository.find_by_name(name).await {
            Ok(Some(current)) => current,
            Ok(None) => return TaskTickOutcome::NotDue,
            Err(err) => {
                error!(task = %name, error = %err, "failed to reload scheduled task");
                return TaskTickOutcome::Failed(err.to_string());
            }
        };
        if !current.is_enabled() || !current.schedule().matches(window) {
            return TaskTickOutcome::NotDue;
        }
        if current.has_run_in(window) {
            debug!(task = %name, "task already ran in this window");
            return TaskTickOutcome::AlreadyRan;
        }

        current.record_run(&*self.clock);
        if let Err(err) = self.repository.update_run_times(&current).await {
            error!(task = %name, error = %err, "failed to record task run");
            return TaskTickOutcome::Failed(err.to_string());
        }

        info!(task = %name, command = %current.command(), "dispatching scheduled task");
        match self.dispatcher.dispatch(current.command()).await {
            Ok(()) => TaskTickOutcome::Dispatched,
            Err(err) => {
                error!(
                    task = %name,
                    command = %current.command(),
                    error = %err,
                    "scheduled task failed"
                );
                TaskTickOutcome::Failed(err.to_string())
            }
        }
    }

    async fn release(&self, lease: &TaskLease) {
        if let Err(err) = self.lock.release(lease).await {
            warn!(
                task = %lease.task(),
                error = %err,
                "failed to release task lease, it will expire at {}",
                lease.expires_at()
            );
        }
    }
}
