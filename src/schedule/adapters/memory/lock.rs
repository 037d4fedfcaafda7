//! In-memory lease lock for single-process deployments and tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::schedule::{
    domain::{LockOwner, TaskLease, TaskName},
    ports::{TaskLockError, TaskLockProvider, TaskLockResult},
};

/// Thread-safe in-memory lease table.
///
/// Clones share the same table, so every scheduler built from a clone
/// contends for the same leases.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskLock {
    leases: Arc<Mutex<HashMap<TaskName, TaskLease>>>,
}

impl InMemoryTaskLock {
    /// Creates an empty lease table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lease currently recorded for `task`, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLockError::Backend`] when the table lock is poisoned.
    pub fn current_lease(&self, task: &TaskName) -> TaskLockResult<Option<TaskLease>> {
        let leases = self
            .leases
            .lock()
            .map_err(|err| TaskLockError::backend(std::io::Error::other(err.to_string())))?;
        Ok(leases.get(task).cloned())
    }
}

#[async_trait]
impl TaskLockProvider for InMemoryTaskLock {
    async fn try_acquire(
        &self,
        task: &TaskName,
        owner: &LockOwner,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> TaskLockResult<Option<TaskLease>> {
        let mut leases = self
            .leases
            .lock()
            .map_err(|err| TaskLockError::backend(std::io::Error::other(err.to_string())))?;
        if leases
            .get(task)
            .is_some_and(|held| !held.is_expired_at(now))
        {
            return Ok(None);
        }
        let lease = TaskLease::grant(task.clone(), owner.clone(), now, ttl);
        leases.insert(task.clone(), lease.clone());
        Ok(Some(lease))
    }

    async fn release(&self, lease: &TaskLease) -> TaskLockResult<()> {
        let mut leases = self
            .leases
            .lock()
            .map_err(|err| TaskLockError::backend(std::io::Error::other(err.to_string())))?;
        if leases
            .get(lease.task())
            .is_some_and(|held| held.lease_id() == lease.lease_id())
        {
            leases.remove(lease.task());
        }
        Ok(())
    }
}
