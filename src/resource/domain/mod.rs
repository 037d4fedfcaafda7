//! Domain model for generated game resources.
//!
//! A resource is submitted for generation, retried a bounded number of
//! times, and either surfaced for review or removed. Reviewers then approve
//! or reject it. Every persisted change advances an optimistic concurrency
//! version.

mod attempt;
mod error;
mod event;
mod ids;
mod resource;
mod status;

pub use attempt::GenerationAttempt;
pub use error::{ParseResourceKindError, ParseResourceStatusError, ResourceDomainError};
pub use event::ResourceEvent;
pub use ids::{ActorRef, ArtifactPath, ResourceId};
pub use resource::{PersistedResourceData, Resource};
pub use status::{ResourceKind, ResourceStatus};
