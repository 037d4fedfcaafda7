//! Bounded-retry generation of resource artifacts.

use super::ResourceEvents;
use crate::resource::{
    domain::{Resource, ResourceDomainError, ResourceEvent, ResourceId, ResourceStatus},
    ports::{GenerationWork, ResourceRepository, ResourceRepositoryError, WorkFailure},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// What the terminal policy did with a resource whose attempts ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalDisposition {
    /// An earlier attempt left an artifact; the resource now awaits review.
    SurfacedForReview,
    /// Nothing usable was produced; the resource was removed.
    Deleted,
}

/// Successful execution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// An attempt produced the artifact and the resource awaits review.
    Generated {
        /// Persisted resource after the transition.
        resource: Resource,
        /// Number of the attempt that succeeded.
        attempt: u32,
    },
}

impl ExecutionOutcome {
    /// Returns the persisted resource.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        match self {
            Self::Generated { resource, .. } => resource,
        }
    }
}

/// Errors returned by [`GenerationExecutor::execute`].
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The attempt budget must be at least one.
    #[error("max attempts must be at least 1")]
    InvalidMaxAttempts,

    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// The resource is not awaiting generation; no attempt was made.
    #[error("resource {resource_id} is {status}, expected generating")]
    InvalidState {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Status found.
        status: ResourceStatus,
    },

    /// Every permitted attempt failed; the terminal policy has been applied.
    #[error(
        "generation of resource {resource_id} failed after {attempts} attempts: {last_failure}"
    )]
    Exhausted {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Number of failed attempts on record.
        attempts: u32,
        /// What happened to the resource.
        disposition: TerminalDisposition,
        /// Failure of the final attempt.
        #[source]
        last_failure: WorkFailure,
    },

    /// A lifecycle rule rejected a transition.
    #[error(transparent)]
    Domain(#[from] ResourceDomainError),

    /// Repository operation failed, including concurrent modification.
    #[error(transparent)]
    Repository(#[from] ResourceRepositoryError),
}

/// Result type for generation execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Runs generation work against a resource with a bounded attempt budget.
///
/// Attempts for one resource are strictly sequential and the executor never
/// sleeps between them; backoff belongs to whatever queue invokes it.
#[derive(Clone)]
pub struct GenerationExecutor<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: ResourceEvents,
    clock: Arc<C>,
}

impl<R, C> GenerationExecutor<R, C>
where
    R: ResourceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new executor.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: ResourceEvents, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    /// Generates the artifact for resource `id`.
    ///
    /// Attempt numbers continue from the resource's attempt log, so a
    /// redelivered job never exceeds `max_attempts` in total. Each failure is
    /// persisted before the next attempt starts.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::InvalidMaxAttempts`] when `max_attempts` is zero.
    /// - [`ExecutionError::NotFound`] when the resource does not exist.
    /// - [`ExecutionError::InvalidState`] when the resource is not
    ///   generating. Nothing is attempted.
    /// - [`ExecutionError::Exhausted`] after the final attempt failed and the
    ///   terminal policy ran.
    /// - [`ExecutionError::Repository`] when persistence fails or the resource
    ///   was modified concurrently.
    pub async fn execute<W>(
        &self,
        id: ResourceId,
        work: &W,
        max_attempts: u32,
    ) -> ExecutionResult<ExecutionOutcome>
    where
        W: GenerationWork + ?Sized,
    {
        if max_attempts == 0 {
            return Err(ExecutionError::InvalidMaxAttempts);
        }
        let mut resource = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ExecutionError::NotFound(id))?;
        if resource.status() != ResourceStatus::Generating {
            warn!(
                resource_id = %id,
                status = %resource.status(),
                "resource is not generating, skipping execution"
            );
            return Err(ExecutionError::InvalidState {
                resource_id: id,
                status: resource.status(),
            });
        }

        let mut latest_failure = None;
        while resource.next_attempt_number() <= max_attempts {
            let attempt = resource.next_attempt_number();
            info!(resource_id = %id, attempt, max_attempts, "attempting resource generation");

            match work.generate(&resource, attempt).await {
                Ok(artifact_path) => {
                    resource.complete_generation(artifact_path.clone(), &*self.clock)?;
                    let saved = self.repository.update(&resource).await?;
                    info!(
                        resource_id = %id,
                        attempt,
                        artifact = %artifact_path,
                        "resource generated"
                    );
                    self.events
                        .publish(&ResourceEvent::Surfaced {
                            resource_id: id,
                            kind: saved.kind(),
                            artifact_path,
                            exhausted: false,
                        })
                        .await;
                    return Ok(ExecutionOutcome::Generated {
                        resource: saved,
                        attempt,
                    });
                }
                Err(failure) => {
                    error!(
                        resource_id = %id,
                        attempt,
                        max_attempts,
                        error = %failure,
                        "resource generation attempt failed"
                    );
                    resource.record_failure(
                        failure.message(),
                        failure.partial_artifact().cloned(),
                        &*self.clock,
                    )?;
                    resource = self.repository.update(&resource).await?;
                    if attempt < max_attempts {
                        info!(
                            resource_id = %id,
                            attempt,
                            max_attempts,
                            "will retry resource generation"
                        );
                    }
                    latest_failure = Some(failure);
                }
            }
        }

        let last_failure = latest_failure.unwrap_or_else(|| previous_failure(&resource));
        let attempts = u32::try_from(resource.attempts().len()).unwrap_or(u32::MAX);
        let disposition = self.apply_terminal_policy(resource).await?;
        Err(ExecutionError::Exhausted {
            resource_id: id,
            attempts,
            disposition,
            last_failure,
        })
    }

    async fn apply_terminal_policy(
        &self,
        mut resource: Resource,
    ) -> ExecutionResult<TerminalDisposition> {
        let id = resource.id();
        if let Some(artifact_path) = resource.artifact_path().cloned() {
            resource.surface_for_review(&*self.clock)?;
            let saved = self.repository.update(&resource).await?;
            warn!(
                resource_id = %id,
                artifact = %artifact_path,
                "exhausted attempts but artifact exists, surfacing for manual review"
            );
            self.events
                .publish(&ResourceEvent::Surfaced {
                    resource_id: id,
                    kind: saved.kind(),
                    artifact_path,
                    exhausted: true,
                })
                .await;
            return Ok(TerminalDisposition::SurfacedForReview);
        }

        self.repository.delete(&resource).await?;
        info!(
            resource_id = %id,
            attempts = resource.attempts().len(),
            "exhausted attempts without artifact, resource deleted"
        );
        self.events
            .publish(&ResourceEvent::Deleted {
                resource_id: id,
                kind: resource.kind(),
                attempts: resource.attempts().to_vec(),
            })
            .await;
        Ok(TerminalDisposition::Deleted)
    }
}

/// Rebuilds the failure to report when the attempt log was already full on
/// entry and no attempt ran in this call.
fn previous_failure(resource: &Resource) -> WorkFailure {
    let message = resource.attempts().last().map_or_else(
        || "attempt budget already spent".to_owned(),
        |attempt| attempt.error_message().to_owned(),
    );
    let failure = WorkFailure::new(message);
    if let Some(artifact) = resource.artifact_path() {
        return failure.with_partial_artifact(artifact.clone());
    }
    failure
}
