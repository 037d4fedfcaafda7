//! Lifecycle notifications published after resource transitions persist.

use super::{ActorRef, ArtifactPath, GenerationAttempt, ResourceId, ResourceKind};

/// Transition notice delivered to registered listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    /// The resource entered the review queue.
    Surfaced {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Resource kind.
        kind: ResourceKind,
        /// Artifact awaiting review.
        artifact_path: ArtifactPath,
        /// `true` when attempts ran out and an earlier artifact was kept.
        exhausted: bool,
    },
    /// Attempts ran out without an artifact and the resource was removed.
    Deleted {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Resource kind.
        kind: ResourceKind,
        /// Failed attempts recorded before removal.
        attempts: Vec<GenerationAttempt>,
    },
    /// An approver accepted the resource.
    Approved {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Resource kind.
        kind: ResourceKind,
        /// Deciding approver.
        approver: ActorRef,
    },
    /// An approver refused the resource.
    Rejected {
        /// Resource identifier.
        resource_id: ResourceId,
        /// Resource kind.
        kind: ResourceKind,
        /// Deciding approver.
        approver: ActorRef,
        /// Optional reason.
        reason: Option<String>,
    },
}

impl ResourceEvent {
    /// Returns the affected resource.
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        match self {
            Self::Surfaced { resource_id, .. }
            | Self::Deleted { resource_id, .. }
            | Self::Approved { resource_id, .. }
            | Self::Rejected { resource_id, .. } => *resource_id,
        }
    }

    /// Returns the affected resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Surfaced { kind, .. }
            | Self::Deleted { kind, .. }
            | Self::Approved { kind, .. }
            | Self::Rejected { kind, .. } => *kind,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Surfaced { .. } => "surfaced",
            Self::Deleted { .. } => "deleted",
            Self::Approved { .. } => "approved",
            Self::Rejected { .. } => "rejected",
        }
    }
}
