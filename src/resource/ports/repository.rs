//! Repository port for resource persistence.

use crate::resource::domain::{Resource, ResourceId, ResourceStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for resource repository operations.
pub type ResourceRepositoryResult<T> = Result<T, ResourceRepositoryError>;

/// Resource persistence contract with optimistic concurrency.
///
/// Writes succeed only when the stored version equals the version carried by
/// the aggregate.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Stores a new resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRepositoryError::DuplicateResource`] when the
    /// identifier already exists.
    async fn store(&self, resource: &Resource) -> ResourceRepositoryResult<()>;

    /// Persists changes to an existing resource and returns the stored copy
    /// with its new version.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRepositoryError::NotFound`] when the resource does
    /// not exist and [`ResourceRepositoryError::VersionConflict`] when it was
    /// modified since it was read.
    async fn update(&self, resource: &Resource) -> ResourceRepositoryResult<Resource>;

    /// Removes a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRepositoryError::NotFound`] when the resource does
    /// not exist and [`ResourceRepositoryError::VersionConflict`] when it was
    /// modified since it was read.
    async fn delete(&self, resource: &Resource) -> ResourceRepositoryResult<()>;

    /// Finds a resource by identifier.
    ///
    /// Returns `None` when the resource does not exist.
    async fn find_by_id(&self, id: ResourceId) -> ResourceRepositoryResult<Option<Resource>>;

    /// Returns resources with `status`, oldest first.
    async fn find_by_status(
        &self,
        status: ResourceStatus,
    ) -> ResourceRepositoryResult<Vec<Resource>>;
}

/// Errors returned by resource repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ResourceRepositoryError {
    /// A resource with the same identifier already exists.
    #[error("duplicate resource identifier: {0}")]
    DuplicateResource(ResourceId),

    /// The resource was not found.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// The resource changed since it was read.
    #[error("resource {resource_id} was modified concurrently, expected version {expected}")]
    VersionConflict {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Version the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResourceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
