//! Service layer for provisioning and switching scheduled tasks.

use crate::schedule::{
    domain::{ScheduledTask, TaskDefinition, TaskName},
    ports::{ScheduledTaskRepository, ScheduledTaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for task registry operations.
#[derive(Debug, Error)]
pub enum TaskRegistryError {
    /// No task exists with the given name.
    #[error("scheduled task not found: {0}")]
    NotFound(TaskName),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ScheduledTaskRepositoryError),
}

/// Result type for task registry operations.
pub type TaskRegistryResult<T> = Result<T, TaskRegistryError>;

/// Whether provisioning created a task or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new task was stored.
    Created,
    /// An existing task received the new definition.
    Updated,
}

/// Registry of named recurring tasks.
///
/// Every change is written through to the repository before the call
/// returns, so the next scheduler tick observes it.
#[derive(Clone)]
pub struct TaskRegistryService<R, C>
where
    R: ScheduledTaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskRegistryService<R, C>
where
    R: ScheduledTaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates or refreshes a task from a provisioning definition.
    ///
    /// Refreshing keeps the stored enabled flag and run bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn provision(
        &self,
        definition: TaskDefinition,
    ) -> TaskRegistryResult<(ScheduledTask, ProvisionOutcome)> {
        if let Some(mut existing) = self.repository.find_by_name(definition.name()).await? {
            existing.redefine(definition, &*self.clock);
            self.repository.update_definition(&existing).await?;
            info!(task = %existing.name(), "scheduled task definition refreshed");
            return Ok((existing, ProvisionOutcome::Updated));
        }

        let task = ScheduledTask::provision(definition, &*self.clock);
        self.repository.store(&task).await?;
        info!(
            task = %task.name(),
            enabled = task.is_enabled(),
            schedule = %task.schedule(),
            "scheduled task provisioned"
        );
        Ok((task, ProvisionOutcome::Created))
    }

    /// Enables a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::NotFound`] for unknown names and
    /// [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn enable(&self, name: &TaskName) -> TaskRegistryResult<ScheduledTask> {
        self.switch(name, |task, clock| task.enable(clock)).await
    }

    /// Disables a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::NotFound`] for unknown names and
    /// [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn disable(&self, name: &TaskName) -> TaskRegistryResult<ScheduledTask> {
        self.switch(name, |task, clock| task.disable(clock)).await
    }

    /// Flips a task's enabled flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::NotFound`] for unknown names and
    /// [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn toggle(&self, name: &TaskName) -> TaskRegistryResult<ScheduledTask> {
        self.switch(name, |task, clock| task.toggle(clock)).await
    }

    /// Returns all enabled tasks ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn find_enabled(&self) -> TaskRegistryResult<Vec<ScheduledTask>> {
        Ok(self.repository.find_enabled().await?)
    }

    /// Retrieves a task by name.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn find_by_name(&self, name: &TaskName) -> TaskRegistryResult<Option<ScheduledTask>> {
        Ok(self.repository.find_by_name(name).await?)
    }

    /// Returns every task ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Repository`] when persistence fails.
    pub async fn list_all(&self) -> TaskRegistryResult<Vec<ScheduledTask>> {
        Ok(self.repository.list_all().await?)
    }

    async fn switch(
        &self,
        name: &TaskName,
        apply: impl FnOnce(&mut ScheduledTask, &C) + Send,
    ) -> TaskRegistryResult<ScheduledTask> {
        let mut task = self
            .repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| TaskRegistryError::NotFound(name.clone()))?;
        apply(&mut task, &*self.clock);
        self.repository
            .update_enabled(&task)
            .await
            .map_err(|err| match err {
                ScheduledTaskRepositoryError::NotFound(missing) => {
                    TaskRegistryError::NotFound(missing)
                }
                other => TaskRegistryError::Repository(other),
            })?;
        info!(task = %task.name(), enabled = task.is_enabled(), "scheduled task switched");
        Ok(task)
    }
}
