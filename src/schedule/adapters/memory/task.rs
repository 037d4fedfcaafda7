//! In-memory repository for scheduled tasks.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::schedule::{
    domain::{PersistedScheduledTaskData, ScheduledTask, TaskName},
    ports::{ScheduledTaskRepository, ScheduledTaskRepositoryError, ScheduledTaskRepositoryResult},
};

/// Thread-safe in-memory scheduled task repository.
///
/// Tasks are keyed by name in a [`BTreeMap`], which yields the name ordering
/// the listing operations promise.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduledTaskRepository {
    state: Arc<RwLock<BTreeMap<TaskName, ScheduledTask>>>,
}

impl InMemoryScheduledTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn modify(
        &self,
        name: &TaskName,
        apply: impl FnOnce(&ScheduledTask) -> PersistedScheduledTaskData,
    ) -> ScheduledTaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ScheduledTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .get_mut(name)
            .ok_or_else(|| ScheduledTaskRepositoryError::NotFound(name.clone()))?;
        *stored = ScheduledTask::from_persisted(apply(stored));
        Ok(())
    }
}

fn snapshot(task: &ScheduledTask) -> PersistedScheduledTaskData {
    PersistedScheduledTaskData {
        name: task.name().clone(),
        command: task.command().clone(),
        schedule: task.schedule().clone(),
        description: task.description().map(str::to_owned),
        is_enabled: task.is_enabled(),
        last_run_at: task.last_run_at(),
        next_run_at: task.next_run_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

#[async_trait]
impl ScheduledTaskRepository for InMemoryScheduledTaskRepository {
    async fn store(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ScheduledTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.contains_key(task.name()) {
            return Err(ScheduledTaskRepositoryError::DuplicateTask(
                task.name().clone(),
            ));
        }
        state.insert(task.name().clone(), task.clone());
        Ok(())
    }

    async fn update_definition(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        self.modify(task.name(), |stored| PersistedScheduledTaskData {
            command: task.command().clone(),
            schedule: task.schedule().clone(),
            description: task.description().map(str::to_owned),
            next_run_at: task.next_run_at(),
            updated_at: task.updated_at(),
            ..snapshot(stored)
        })
    }

    async fn update_enabled(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        self.modify(task.name(), |stored| PersistedScheduledTaskData {
            is_enabled: task.is_enabled(),
            updated_at: task.updated_at(),
            ..snapshot(stored)
        })
    }

    async fn update_run_times(&self, task: &ScheduledTask) -> ScheduledTaskRepositoryResult<()> {
        self.modify(task.name(), |stored| PersistedScheduledTaskData {
            last_run_at: task.last_run_at(),
            next_run_at: task.next_run_at(),
            updated_at: task.updated_at(),
            ..snapshot(stored)
        })
    }

    async fn find_by_name(
        &self,
        name: &TaskName,
    ) -> ScheduledTaskRepositoryResult<Option<ScheduledTask>> {
        let state = self.state.read().map_err(|err| {
            ScheduledTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(name).cloned())
    }

    async fn find_enabled(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>> {
        let state = self.state.read().map_err(|err| {
            ScheduledTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .values()
            .filter(|task| task.is_enabled())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> ScheduledTaskRepositoryResult<Vec<ScheduledTask>> {
        let state = self.state.read().map_err(|err| {
            ScheduledTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.values().cloned().collect())
    }
}
