//! Work port that produces a resource's artifact.

use crate::resource::domain::{ArtifactPath, Resource};
use async_trait::async_trait;
use thiserror::Error;

/// Calls the generation API and writes the result to object storage.
///
/// Timeouts are the implementation's concern and surface as a
/// [`WorkFailure`].
#[async_trait]
pub trait GenerationWork: Send + Sync {
    /// Produces the artifact for `resource` during attempt `attempt`.
    async fn generate(&self, resource: &Resource, attempt: u32)
    -> Result<ArtifactPath, WorkFailure>;
}

/// A failed generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WorkFailure {
    message: String,
    partial_artifact: Option<ArtifactPath>,
}

impl WorkFailure {
    /// Creates a failure without any usable output.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            partial_artifact: None,
        }
    }

    /// Records an artifact the attempt stored before failing.
    #[must_use]
    pub fn with_partial_artifact(mut self, artifact: ArtifactPath) -> Self {
        self.partial_artifact = Some(artifact);
        self
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the partial artifact, if any.
    #[must_use]
    pub const fn partial_artifact(&self) -> Option<&ArtifactPath> {
        self.partial_artifact.as_ref()
    }
}
