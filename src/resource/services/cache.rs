//! Cached listing of approved resources.

use crate::resource::{
    domain::{Resource, ResourceEvent, ResourceKind, ResourceStatus},
    ports::{ListenerError, ResourceEventListener, ResourceRepository, ResourceRepositoryError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::debug;

#[derive(Default)]
struct CacheState {
    entries: HashMap<ResourceKind, Vec<Resource>>,
    generations: HashMap<ResourceKind, u64>,
}

impl CacheState {
    fn generation(&self, kind: ResourceKind) -> u64 {
        self.generations.get(&kind).copied().unwrap_or_default()
    }
}

/// Approved resources grouped by kind, loaded lazily and dropped whenever a
/// lifecycle event could change the listing.
///
/// Register the cache with [`super::ResourceEvents`] so decisions and
/// deletions invalidate it. Every invalidation bumps a per-kind generation; a
/// load only fills the cache when no invalidation for its kind arrived while
/// the query ran.
#[derive(Clone)]
pub struct ApprovedResourceCache<R>
where
    R: ResourceRepository,
{
    repository: Arc<R>,
    state: Arc<RwLock<CacheState>>,
}

impl<R> ApprovedResourceCache<R>
where
    R: ResourceRepository,
{
    /// Creates an empty cache over `repository`.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            state: Arc::default(),
        }
    }

    /// Returns approved resources of `kind`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRepositoryError`] when the repository query fails or
    /// the cache lock is poisoned.
    pub async fn approved(
        &self,
        kind: ResourceKind,
    ) -> Result<Vec<Resource>, ResourceRepositoryError> {
        let observed = {
            let state = self.read_state()?;
            if let Some(cached) = state.entries.get(&kind) {
                return Ok(cached.clone());
            }
            state.generation(kind)
        };
        let loaded: Vec<Resource> = self
            .repository
            .find_by_status(ResourceStatus::Approved)
            .await?
            .into_iter()
            .filter(|resource| resource.kind() == kind)
            .collect();
        let mut state = self.state.write().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.generation(kind) == observed {
            state.entries.insert(kind, loaded.clone());
        } else {
            debug!(kind = %kind, "approved resource listing went stale while loading");
        }
        Ok(loaded)
    }

    /// Returns `true` when a listing for `kind` is currently cached.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRepositoryError`] when the cache lock is poisoned.
    pub fn is_cached(&self, kind: ResourceKind) -> Result<bool, ResourceRepositoryError> {
        Ok(self.read_state()?.entries.contains_key(&kind))
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, CacheState>, ResourceRepositoryError> {
        self.state.read().map_err(|err| {
            ResourceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl<R> ResourceEventListener for ApprovedResourceCache<R>
where
    R: ResourceRepository,
{
    async fn on_event(&self, event: &ResourceEvent) -> Result<(), ListenerError> {
        if matches!(event, ResourceEvent::Surfaced { .. }) {
            return Ok(());
        }
        let kind = event.kind();
        let mut state = self
            .state
            .write()
            .map_err(|err| ListenerError::new(std::io::Error::other(err.to_string())))?;
        state.entries.remove(&kind);
        let next = state.generation(kind).wrapping_add(1);
        state.generations.insert(kind, next);
        debug!(
            kind = %kind,
            event = event.label(),
            "approved resource cache invalidated"
        );
        Ok(())
    }
}
