//! `PostgreSQL` repository implementation for scheduled task storage.

use super::{
    SchedulePgPool,
    models::{NewScheduledTaskRow, ScheduledTaskRow},
    schema::scheduled_tasks,
};
use crate::schedule::{
    domain::{
        CommandIdentifier, PersistedScheduledTaskData, ScheduleExpression, ScheduledTask, TaskName,
    },
    ports::{ScheduledTaskRepository, ScheduledTaskRepositoryError, ScheduledTaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed scheduled task repository.
#[derive(Debug, Clone)]
pub struct PostgresScheduledTaskRepository {
    pool: SchedulePgPool,
}

impl PostgresScheduledTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ScheduledTaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ScheduledTaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(ScheduledTaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ScheduledTaskRepositoryError::persistence)?
    }

    async fn load_where_enabled(
        &self,
        enabled_only: bool,
    ) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>> {
        self.run_blocking(move |connection| {
            let mut query = scheduled_tasks::table
                .order(scheduled_tasks::name.asc())
                .select(ScheduledTaskRow::as_select())
                .into_boxed();
            if enabled_only {
                query = query.filter(scheduled_tasks::is_enabled.eq(true));
            }
            let rows = query
                .load::<ScheduledTaskRow>(connection)
                .map_err(ScheduledTaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

#[async_trait]
impl ScheduledTaskRepository for PostgresScheduledTaskRepository {
    async fn store(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        let task_name = task.name().clone();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(scheduled_tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ScheduledTaskRepositoryError::DuplicateTask(task_name.clone())
                    }
                    _ => ScheduledTaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_definition(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        let task_name = task.name().clone();
        let command_val = task.command().as_str().to_owned();
        let schedule_val = task.schedule().as_str().to_owned();
        let description_val = task.description().map(str::to_owned);
        let next_run_val = task.next_run_at();
        let updated_val = task.updated_at();

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                scheduled_tasks::table.filter(scheduled_tasks::name.eq(task_name.as_str())),
            )
            .set((
                scheduled_tasks::command.eq(&command_val),
                scheduled_tasks::schedule.eq(&schedule_val),
                scheduled_tasks::description.eq(&description_val),
                scheduled_tasks::next_run_at.eq(next_run_val),
                scheduled_tasks::updated_at.eq(updated_val),
            ))
            .execute(connection)
            .map_err(ScheduledTaskRepositoryError::persistence)?;
            ensure_updated(updated_count, task_name)
        })
        .await
    }

    async fn update_enabled(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        let task_name = task.name().clone();
        let enabled_val = task.is_enabled();
        let updated_val = task.updated_at();

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                scheduled_tasks::table.filter(scheduled_tasks::name.eq(task_name.as_str())),
            )
            .set((
                scheduled_tasks::is_enabled.eq(enabled_val),
                scheduled_tasks::updated_at.eq(updated_val),
            ))
            .execute(connection)
            .map_err(ScheduledTaskRepositoryError::persistence)?;
            ensure_updated(updated_count, task_name)
        })
        .await
    }

    async fn update_run_times(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        let task_name = task.name().clone();
        let last_run_val = task.last_run_at();
        let next_run_val = task.next_run_at();
        let updated_val = task.updated_at();

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                scheduled_tasks::table.filter(scheduled_tasks::name.eq(task_name.as_str())),
            )
            .set((
                scheduled_tasks::last_run_at.eq(last_run_val),
                scheduled_tasks::next_run_at.eq(next_run_val),
                scheduled_tasks::updated_at.eq(updated_val),
            ))
            .execute(connection)
            .map_err(ScheduledTaskRepositoryError::persistence)?;
            ensure_updated(updated_count, task_name)
        })
        .await
    }

    async fn find_by_name(
        &self,
        name: &TaskName,
    ) -> ScheduledTaskRepositoryResult<Option<ScheduledTask>> {
        let name_str = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = scheduled_tasks::table
                .filter(scheduled_tasks::name.eq(&name_str))
                .select(ScheduledTaskRow::as_select())
                .first::<ScheduledTaskRow>(connection)
                .optional()
                .map_err(ScheduledTaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_enabled(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>> {
        self.load_where_enabled(true).await
    }

    async fn list_all(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>> {
        self.load_where_enabled(false).await
    }
}

fn ensure_updated(updated_count: usize, name: TaskName) -> ScheduledTaskRepositoryResult<()> {
    if updated_count == 0 {
        return Err(ScheduledTaskRepositoryError::NotFound(name));
    }
    Ok(())
}

fn to_new_row(task: &ScheduledTask) -> NewScheduledTaskRow {
    NewScheduledTaskRow {
        name: task.name().as_str().to_owned(),
        command: task.command().as_str().to_owned(),
        schedule: task.schedule().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        is_enabled: task.is_enabled(),
        last_run_at: task.last_run_at(),
        next_run_at: task.next_run_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(row: ScheduledTaskRow) -> ScheduledTaskRepositoryResult<ScheduledTask> {
    let data = PersistedScheduledTaskData {
        name: TaskName::new(row.name).map_err(ScheduledTaskRepositoryError::persistence)?,
        command: CommandIdentifier::new(row.command)
            .map_err(ScheduledTaskRepositoryError::persistence)?,
        schedule: ScheduleExpression::parse(row.schedule)
            .map_err(ScheduledTaskRepositoryError::persistence)?,
        description: row.description,
        is_enabled: row.is_enabled,
        last_run_at: row.last_run_at,
        next_run_at: row.next_run_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(ScheduledTask::from_persisted(data))
}
