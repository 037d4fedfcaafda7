//! Lease lock port guarding per-task dispatch.

use crate::schedule::domain::{LockOwner, TaskLease, TaskName};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for lease lock operations.
pub type TaskLockResult<T> = Result<T, TaskLockError>;

/// Mutual exclusion contract for scheduled task dispatch.
#[async_trait]
pub trait TaskLockProvider: Send + Sync {
    /// Attempts to take the lease for `task`.
    ///
    /// Returns `None` while another unexpired lease is held. A lease whose
    /// expiry is at or before `now` is reclaimed.
    async fn try_acquire(
        &self,
        task: &TaskName,
        owner: &LockOwner,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> TaskLockResult<Option<TaskLease>>;

    /// Releases `lease`.
    ///
    /// Releasing a lease that has already been reclaimed by another holder is
    /// a no-op.
    async fn release(&self, lease: &TaskLease) -> TaskLockResult<()>;
}

/// Errors returned by lease lock adapters.
#[derive(Debug, Clone, Error)]
pub enum TaskLockError {
    /// Backend failure.
    #[error("task lock backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskLockError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
