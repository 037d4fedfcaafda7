//! Submission of new resources for generation.

use crate::resource::{
    domain::{ActorRef, Resource, ResourceDomainError, ResourceId, ResourceKind},
    ports::{ResourceRepository, ResourceRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request to create a resource awaiting generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResourceRequest {
    kind: ResourceKind,
    prompt: String,
    submitted_by: String,
}

impl SubmitResourceRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        kind: ResourceKind,
        prompt: impl Into<String>,
        submitted_by: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            submitted_by: submitted_by.into(),
        }
    }

    /// Returns the requested kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the generation prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the raw submitter reference.
    #[must_use]
    pub fn submitted_by(&self) -> &str {
        &self.submitted_by
    }
}

/// Errors returned by [`ResourceSubmissionService`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The request failed validation.
    #[error(transparent)]
    Domain(#[from] ResourceDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ResourceRepositoryError),
}

/// Result type for submission operations.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Creates resources in the generating state.
#[derive(Clone)]
pub struct ResourceSubmissionService<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ResourceSubmissionService<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new submission service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Stores a new resource awaiting generation.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Domain`] for a blank prompt or submitter and
    /// [`SubmissionError::Repository`] when persistence fails.
    pub async fn submit(&self, request: SubmitResourceRequest) -> SubmissionResult<Resource> {
        let submitter = ActorRef::new(request.submitted_by)?;
        let resource = Resource::submit(request.kind, request.prompt, submitter, &*self.clock)?;
        self.repository.store(&resource).await?;
        info!(
            resource_id = %resource.id(),
            kind = %resource.kind(),
            submitted_by = %resource.submitted_by(),
            "resource submitted for generation"
        );
        Ok(resource)
    }

    /// Finds a resource by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Repository`] when the query fails.
    pub async fn find(&self, id: ResourceId) -> SubmissionResult<Option<Resource>> {
        Ok(self.repository.find_by_id(id).await?)
    }
}
