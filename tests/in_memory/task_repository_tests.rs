//! In-memory integration tests for scheduled task persistence.

use super::helpers::{clock, definition};
use chrono::TimeDelta;
use rstest::rstest;
use stellar_jobs::clock::ManualClock;
use stellar_jobs::schedule::{
    adapters::memory::InMemoryScheduledTaskRepository,
    domain::{ScheduledTask, TaskName},
    ports::{ScheduledTaskRepository, ScheduledTaskRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_names_are_rejected(clock: ManualClock) -> Result<(), eyre::Report> {
    let repository = InMemoryScheduledTaskRepository::new();
    let task = ScheduledTask::provision(definition("prune", "03:30")?, &clock);
    repository.store(&task).await?;

    let result = repository.store(&task).await;

    eyre::ensure!(
        matches!(
            result,
            Err(ScheduledTaskRepositoryError::DuplicateTask(ref name)) if name == task.name()
        ),
        "expected duplicate error, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enabled_flag_updates_leave_run_times_alone(
    clock: ManualClock,
) -> Result<(), eyre::Report> {
    let repository = InMemoryScheduledTaskRepository::new();
    let mut task = ScheduledTask::provision(definition("prune", "03:30")?, &clock);
    repository.store(&task).await?;

    let mut ran = task.clone();
    clock.advance(TimeDelta::hours(4));
    ran.record_run(&clock);
    repository.update_run_times(&ran).await?;

    task.disable(&clock);
    repository.update_enabled(&task).await?;

    let stored = repository
        .find_by_name(task.name())
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    eyre::ensure!(!stored.is_enabled(), "task should be disabled");
    eyre::ensure!(
        stored.last_run_at() == ran.last_run_at(),
        "run bookkeeping must survive a toggle"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enabled_listing_is_name_ordered(clock: ManualClock) -> Result<(), eyre::Report> {
    let repository = InMemoryScheduledTaskRepository::new();
    for name in ["zeta-report", "alpha-cleanup", "mid-refresh"] {
        repository
            .store(&ScheduledTask::provision(definition(name, "*/5 * * * *")?, &clock))
            .await?;
    }
    let mut hidden = ScheduledTask::provision(definition("beta-hidden", "03:30")?, &clock);
    hidden.disable(&clock);
    repository.store(&hidden).await?;

    let enabled: Vec<TaskName> = repository
        .find_enabled()
        .await?
        .iter()
        .map(|task| task.name().clone())
        .collect();

    let expected = vec![
        TaskName::new("alpha-cleanup")?,
        TaskName::new("mid-refresh")?,
        TaskName::new("zeta-report")?,
    ];
    eyre::ensure!(enabled == expected, "unexpected listing {enabled:?}");
    eyre::ensure!(repository.list_all().await?.len() == 4, "all tasks listed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_an_unknown_task_is_not_found(clock: ManualClock) -> Result<(), eyre::Report> {
    let repository = InMemoryScheduledTaskRepository::new();
    let task = ScheduledTask::provision(definition("ghost", "03:30")?, &clock);

    let result = repository.update_enabled(&task).await;

    eyre::ensure!(
        matches!(result, Err(ScheduledTaskRepositoryError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    Ok(())
}
