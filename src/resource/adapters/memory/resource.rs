//! In-memory repository for generated resources.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::resource::{
    domain::{Resource, ResourceId, ResourceStatus},
    ports::{ResourceRepository, ResourceRepositoryError, ResourceRepositoryResult},
};

/// Thread-safe in-memory resource repository with version checks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceRepository {
    state: Arc<RwLock<HashMap<ResourceId, Resource>>>,
}

impl InMemoryResourceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(stored: &Resource, incoming: &Resource) -> ResourceRepositoryResult<()> {
    if stored.version() != incoming.version() {
        return Err(ResourceRepositoryError::VersionConflict {
            resource_id: incoming.id(),
            expected: incoming.version(),
        });
    }
    Ok(())
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn store(&self, resource: &Resource) -> ResourceRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.contains_key(&resource.id()) {
            return Err(ResourceRepositoryError::DuplicateResource(resource.id()));
        }
        state.insert(resource.id(), resource.clone());
        Ok(())
    }

    async fn update(&self, resource: &Resource) -> ResourceRepositoryResult<Resource> {
        let mut state = self.state.write().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .get_mut(&resource.id())
            .ok_or(ResourceRepositoryError::NotFound(resource.id()))?;
        check_version(stored, resource)?;

        let saved = resource
            .clone()
            .with_version(resource.version().saturating_add(1));
        *stored = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, resource: &Resource) -> ResourceRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let stored = state
            .get(&resource.id())
            .ok_or(ResourceRepositoryError::NotFound(resource.id()))?;
        check_version(stored, resource)?;
        state.remove(&resource.id());
        Ok(())
    }

    async fn find_by_id(&self, id: ResourceId) -> ResourceRepositoryResult<Option<Resource>> {
        let state = self.state.read().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&id).cloned())
    }

    async fn find_by_status(
        &self,
        status: ResourceStatus,
    ) -> ResourceRepositoryResult<Vec<Resource>> {
        let state = self.state.read().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut matching: Vec<Resource> = state
            .values()
            .filter(|resource| resource.status() == status)
            .cloned()
            .collect();
        matching.sort_by_key(|resource| (resource.created_at(), resource.id()));
        Ok(matching)
    }
}
