//! Port contracts for resource generation and review.

mod events;
mod generator;
mod repository;

pub use events::{ListenerError, ResourceEventListener};
pub use generator::{GenerationWork, WorkFailure};
pub use repository::{ResourceRepository, ResourceRepositoryError, ResourceRepositoryResult};
