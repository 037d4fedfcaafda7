//! `PostgreSQL` lease lock shared by every scheduler process.

use super::{SchedulePgPool, models::NewTaskLeaseRow, schema::task_leases};
use crate::schedule::{
    domain::{LockOwner, TaskLease, TaskName},
    ports::{TaskLockError, TaskLockProvider, TaskLockResult},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed lease lock.
///
/// Acquisition is a single upsert that only overwrites an existing row once
/// its expiry has passed, so concurrent schedulers race on the row lock and
/// exactly one of them observes an affected row.
#[derive(Debug, Clone)]
pub struct PostgresTaskLock {
    pool: SchedulePgPool,
}

impl PostgresTaskLock {
    /// Creates a new lock from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskLockResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskLockResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskLockError::backend)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskLockError::backend)?
    }
}

#[async_trait]
impl TaskLockProvider for PostgresTaskLock {
    async fn try_acquire(
        &self,
        task: &TaskName,
        owner: &LockOwner,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> TaskLockResult<Option<TaskLease>> {
        let lease = TaskLease::grant(task.clone(), owner.clone(), now, ttl);
        let row = to_lease_row(&lease);

        self.run_blocking(move |connection| {
            let affected = diesel::sql_query(concat!(
                "INSERT INTO task_leases (task_name, lease_id, owner, acquired_at, expires_at) ",
                "VALUES ($1, $2, $3, $4, $5) ",
                "ON CONFLICT (task_name) DO UPDATE SET ",
                "lease_id = EXCLUDED.lease_id, owner = EXCLUDED.owner, ",
                "acquired_at = EXCLUDED.acquired_at, expires_at = EXCLUDED.expires_at ",
                "WHERE task_leases.expires_at <= EXCLUDED.acquired_at",
            ))
            .bind::<diesel::sql_types::Varchar, _>(row.task_name.as_str())
            .bind::<diesel::sql_types::Uuid, _>(row.lease_id)
            .bind::<diesel::sql_types::Varchar, _>(row.owner.as_str())
            .bind::<diesel::sql_types::Timestamptz, _>(row.acquired_at)
            .bind::<diesel::sql_types::Timestamptz, _>(row.expires_at)
            .execute(connection)
            .map_err(TaskLockError::backend)?;
            Ok((affected == 1).then_some(lease))
        })
        .await
    }

    async fn release(&self, lease: &TaskLease) -> TaskLockResult<()> {
        let task_name = lease.task().as_str().to_owned();
        let lease_id = lease.lease_id();
        self.run_blocking(move |connection| {
            diesel::delete(
                task_leases::table
                    .filter(task_leases::task_name.eq(&task_name))
                    .filter(task_leases::lease_id.eq(lease_id)),
            )
            .execute(connection)
            .map_err(TaskLockError::backend)?;
            Ok(())
        })
        .await
    }
}

pub(super) fn to_lease_row(lease: &TaskLease) -> NewTaskLeaseRow {
    NewTaskLeaseRow {
        task_name: lease.task().as_str().to_owned(),
        lease_id: lease.lease_id(),
        owner: lease.owner().as_str().to_owned(),
        acquired_at: lease.acquired_at(),
        expires_at: lease.expires_at(),
    }
}
