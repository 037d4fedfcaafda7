//! Error types for generated resource validation and lifecycle rules.

use super::{ResourceId, ResourceStatus};
use thiserror::Error;

/// Errors returned by resource domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceDomainError {
    /// The generation prompt is empty after trimming.
    #[error("generation prompt must not be empty")]
    EmptyPrompt,

    /// The actor reference is empty after trimming.
    #[error("actor reference must not be empty")]
    EmptyActor,

    /// The artifact path is empty after trimming.
    #[error("artifact path must not be empty")]
    EmptyArtifactPath,

    /// The requested status change is not permitted.
    #[error("resource {resource_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Current status.
        from: ResourceStatus,
        /// Requested status.
        to: ResourceStatus,
    },

    /// A failure was recorded against a resource that is no longer being
    /// generated.
    #[error("resource {resource_id} is {status}, generation attempts are closed")]
    NotGenerating {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Current status.
        status: ResourceStatus,
    },

    /// The resource was surfaced for review without an artifact.
    #[error("resource {0} has no artifact to surface for review")]
    MissingArtifact(ResourceId),
}

/// Error returned when parsing an unknown persisted resource status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resource status: {0}")]
pub struct ParseResourceStatusError(pub String);

/// Error returned when parsing an unknown persisted resource kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resource kind: {0}")]
pub struct ParseResourceKindError(pub String);
