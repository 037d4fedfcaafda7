//! Review gate for surfaced resources.

use super::ResourceEvents;
use crate::resource::{
    domain::{ActorRef, Resource, ResourceDomainError, ResourceEvent, ResourceId, ResourceStatus},
    ports::{ResourceRepository, ResourceRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors returned by [`ApprovalGate`] operations.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// Only pending resources can be decided.
    #[error("resource {resource_id} is {status}, only pending resources can be decided")]
    InvalidState {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Status found.
        status: ResourceStatus,
    },

    /// Validation of the request failed.
    #[error(transparent)]
    Domain(#[from] ResourceDomainError),

    /// Repository operation failed, including concurrent modification.
    #[error(transparent)]
    Repository(#[from] ResourceRepositoryError),
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

/// Moves pending resources to approved or rejected.
#[derive(Clone)]
pub struct ApprovalGate<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: ResourceEvents,
    clock: Arc<C>,
}

impl<R, C> ApprovalGate<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new gate.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: ResourceEvents, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    /// Approves a pending resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown resource,
    /// [`ApprovalError::InvalidState`] unless it is pending, and
    /// [`ApprovalError::Repository`] when the write fails or loses a race.
    pub async fn approve(&self, id: ResourceId, approver: ActorRef) -> ApprovalResult<Resource> {
        let mut resource = self.load(id).await?;
        resource
            .approve(approver.clone(), &*self.clock)
            .map_err(invalid_state)?;
        let saved = self.repository.update(&resource).await?;
        info!(resource_id = %id, approver = %approver, "resource approved");
        self.events
            .publish(&ResourceEvent::Approved {
                resource_id: id,
                kind: saved.kind(),
                approver,
            })
            .await;
        Ok(saved)
    }

    /// Rejects a pending resource with an optional reason.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown resource,
    /// [`ApprovalError::InvalidState`] unless it is pending, and
    /// [`ApprovalError::Repository`] when the write fails or loses a race.
    pub async fn reject(
        &self,
        id: ResourceId,
        approver: ActorRef,
        reason: Option<String>,
    ) -> ApprovalResult<Resource> {
        let mut resource = self.load(id).await?;
        resource
            .reject(approver.clone(), reason, &*self.clock)
            .map_err(invalid_state)?;
        let saved = self.repository.update(&resource).await?;
        info!(
            resource_id = %id,
            approver = %approver,
            reason = saved.rejection_reason().unwrap_or(""),
            "resource rejected"
        );
        self.events
            .publish(&ResourceEvent::Rejected {
                resource_id: id,
                kind: saved.kind(),
                approver,
                reason: saved.rejection_reason().map(str::to_owned),
            })
            .await;
        Ok(saved)
    }

    /// Returns resources awaiting review, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Repository`] when the query fails.
    pub async fn pending_queue(&self) -> ApprovalResult<Vec<Resource>> {
        Ok(self
            .repository
            .find_by_status(ResourceStatus::Pending)
            .await?)
    }

    async fn load(&self, id: ResourceId) -> ApprovalResult<Resource> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ApprovalError::NotFound(id))
    }
}

fn invalid_state(err: ResourceDomainError) -> ApprovalError {
    match err {
        ResourceDomainError::InvalidStatusTransition {
            resource_id, from, ..
        } => ApprovalError::InvalidState {
            resource_id,
            status: from,
        },
        other => ApprovalError::Domain(other),
    }
}
