//! Scheduled task persistence against `PostgreSQL`.

use super::helpers::{TestDatabase, start_of_day, test_runtime};
use chrono::TimeDelta;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use stellar_jobs::clock::ManualClock;
use stellar_jobs::schedule::{
    adapters::postgres::PostgresScheduledTaskRepository,
    domain::{CommandIdentifier, ScheduleExpression, ScheduledTask, TaskDefinition, TaskName},
    ports::{ScheduledTaskRepository, ScheduledTaskRepositoryError},
};

fn provision(
    name: &str,
    schedule: &str,
    clock: &ManualClock,
) -> Result<ScheduledTask, eyre::Report> {
    let definition = TaskDefinition::new(
        TaskName::new(name)?,
        CommandIdentifier::new(format!("stellar:{name}"))?,
        ScheduleExpression::parse(schedule)?,
    );
    Ok(ScheduledTask::provision(definition, clock))
}

#[rstest]
fn duplicate_names_are_rejected(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "task_duplicate")?;
    let repository = PostgresScheduledTaskRepository::new(database.pool()?);
    let clock = ManualClock::new(start_of_day());
    let rt = test_runtime()?;
    let task = provision("prune", "03:30", &clock)?;
    rt.block_on(repository.store(&task))?;

    let result = rt.block_on(repository.store(&task));

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
fn targeted_updates_keep_other_columns(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "task_updates")?;
    let repository = PostgresScheduledTaskRepository::new(database.pool()?);
    let clock = ManualClock::new(start_of_day());
    let rt = test_runtime()?;
    let mut task = provision("prune", "03:30", &clock)?;
    rt.block_on(repository.store(&task))?;

    let mut ran = task.clone();
    clock.advance(TimeDelta::hours(4));
    ran.record_run(&clock);
    rt.block_on(repository.update_run_times(&ran))?;

    task.disable(&clock);
    rt.block_on(repository.update_enabled(&task))?;

    let stored = rt
        .block_on(repository.find_by_name(task.name()))?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    eyre::ensure!(!stored.is_enabled(), "task should be disabled");
    eyre::ensure!(
        stored.last_run_at() == ran.last_run_at(),
        "run bookkeeping must survive a toggle"
    );
    eyre::ensure!(stored.schedule() == task.schedule(), "schedule round-trips");

    let enabled = rt.block_on(repository.find_enabled())?;
    eyre::ensure!(enabled.is_empty(), "disabled task must not be listed as enabled");
    Ok(())
}
