//! Repository port for scheduled task persistence.

use crate::schedule::domain::{ScheduledTask, TaskName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for scheduled task repository operations.
pub type ScheduledTaskRepositoryResult<T> = Result<T, ScheduledTaskRepositoryError>;

/// Scheduled task persistence contract.
///
/// Writes are targeted: toggling the enabled flag never overwrites run
/// bookkeeping written concurrently by a scheduler, and the other way round.
#[async_trait]
pub trait ScheduledTaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduledTaskRepositoryError::DuplicateTask`] when a task
    /// with the same name already exists.
    async fn store(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()>;

    /// Persists the command, schedule, description and `next_run_at` of an
    /// existing task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduledTaskRepositoryError::NotFound`] when the task does
    /// not exist.
    async fn update_definition(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()>;

    /// Persists the enabled flag of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduledTaskRepositoryError::NotFound`] when the task does
    /// not exist.
    async fn update_enabled(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()>;

    /// Persists `last_run_at` and `next_run_at` of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduledTaskRepositoryError::NotFound`] when the task does
    /// not exist.
    async fn update_run_times(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()>;

    /// Finds a task by name.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_name(
        &self,
        name: &TaskName,
    ) -> ScheduledTaskRepositoryResult<Option<ScheduledTask>>;

    /// Returns all enabled tasks ordered by name.
    async fn find_enabled(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>>;

    /// Returns every task ordered by name.
    async fn list_all(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>>;
}

/// Errors returned by scheduled task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ScheduledTaskRepositoryError {
    /// A task with the same name already exists.
    #[error("duplicate scheduled task: {0}")]
    DuplicateTask(TaskName),

    /// The task was not found.
    #[error("scheduled task not found: {0}")]
    NotFound(TaskName),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ScheduledTaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
