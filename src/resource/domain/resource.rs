//! Generated resource aggregate root.

use super::{
    ActorRef, ArtifactPath, GenerationAttempt, ResourceDomainError, ResourceId, ResourceKind,
    ResourceStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A game asset produced by the generation pipeline and gated by approval.
///
/// The generation executor owns the resource while it is
/// [`ResourceStatus::Generating`]; from [`ResourceStatus::Pending`] onward only
/// an approver may change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    kind: ResourceKind,
    prompt: String,
    submitted_by: ActorRef,
    status: ResourceStatus,
    artifact_path: Option<ArtifactPath>,
    attempts: Vec<GenerationAttempt>,
    approver: Option<ActorRef>,
    decided_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedResourceData {
    /// Persisted identifier.
    pub id: ResourceId,
    /// Persisted kind.
    pub kind: ResourceKind,
    /// Persisted generation prompt.
    pub prompt: String,
    /// Persisted submitter.
    pub submitted_by: ActorRef,
    /// Persisted status.
    pub status: ResourceStatus,
    /// Persisted artifact path, if any.
    pub artifact_path: Option<ArtifactPath>,
    /// Persisted failed attempts in order.
    pub attempts: Vec<GenerationAttempt>,
    /// Persisted approver, if decided.
    pub approver: Option<ActorRef>,
    /// Persisted decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Persisted rejection reason.
    pub rejection_reason: Option<String>,
    /// Persisted concurrency token.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Version assigned to a freshly submitted resource.
    pub const INITIAL_VERSION: u64 = 1;

    /// Creates a resource awaiting generation.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::EmptyPrompt`] for a blank prompt.
    pub fn submit(
        kind: ResourceKind,
        prompt: impl Into<String>,
        submitted_by: ActorRef,
        clock: &impl Clock,
    ) -> Result<Self, ResourceDomainError> {
        let raw_prompt = prompt.into();
        let trimmed = raw_prompt.trim();
        if trimmed.is_empty() {
            return Err(ResourceDomainError::EmptyPrompt);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ResourceId::new(),
            kind,
            prompt: trimmed.to_owned(),
            submitted_by,
            status: ResourceStatus::Generating,
            artifact_path: None,
            attempts: Vec::new(),
            approver: None,
            decided_at: None,
            rejection_reason: None,
            version: Self::INITIAL_VERSION,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a resource from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedResourceData) -> Self {
        Self {
            id: data.id,
            kind: data.kind,
            prompt: data.prompt,
            submitted_by: data.submitted_by,
            status: data.status,
            artifact_path: data.artifact_path,
            attempts: data.attempts,
            approver: data.approver,
            decided_at: data.decided_at,
            rejection_reason: data.rejection_reason,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns a copy carrying `version`, as handed back by repositories
    /// after a successful write.
    #[must_use]
    pub const fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the generation prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the submitter.
    #[must_use]
    pub const fn submitted_by(&self) -> &ActorRef {
        &self.submitted_by
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Returns the artifact path, if any attempt produced one.
    #[must_use]
    pub const fn artifact_path(&self) -> Option<&ArtifactPath> {
        self.artifact_path.as_ref()
    }

    /// Returns failed attempts in the order they happened.
    #[must_use]
    pub fn attempts(&self) -> &[GenerationAttempt] {
        &self.attempts
    }

    /// Returns the approver, once decided.
    #[must_use]
    pub const fn approver(&self) -> Option<&ActorRef> {
        self.approver.as_ref()
    }

    /// Returns the decision timestamp.
    #[must_use]
    pub const fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Returns the rejection reason.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns the optimistic concurrency token.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the number the next attempt will carry.
    #[must_use]
    pub fn next_attempt_number(&self) -> u32 {
        u32::try_from(self.attempts.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    /// Appends a failed attempt.
    ///
    /// A failure may still have produced a usable artifact (for example the
    /// still image of a planet whose video step failed); it is kept so the
    /// terminal policy can surface it.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::NotGenerating`] once the resource has
    /// left [`ResourceStatus::Generating`].
    pub fn record_failure(
        &mut self,
        error_message: impl Into<String>,
        partial_artifact: Option<ArtifactPath>,
        clock: &impl Clock,
    ) -> Result<GenerationAttempt, ResourceDomainError> {
        if self.status != ResourceStatus::Generating {
            return Err(ResourceDomainError::NotGenerating {
                resource_id: self.id,
                status: self.status,
            });
        }
        let timestamp = clock.utc();
        if partial_artifact.is_some() {
            self.artifact_path = partial_artifact;
        }
        let attempt = GenerationAttempt::new(self.next_attempt_number(), error_message, timestamp);
        self.attempts.push(attempt.clone());
        self.updated_at = timestamp;
        Ok(attempt)
    }

    /// Stores the generated artifact and hands the resource to review.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::InvalidStatusTransition`] unless the
    /// resource is being generated.
    pub fn complete_generation(
        &mut self,
        artifact_path: ArtifactPath,
        clock: &impl Clock,
    ) -> Result<(), ResourceDomainError> {
        self.ensure_transition(ResourceStatus::Pending)?;
        self.artifact_path = Some(artifact_path);
        self.status = ResourceStatus::Pending;
        self.touch(clock);
        Ok(())
    }

    /// Hands a resource whose attempts ran out to review, keeping the
    /// artifact an earlier attempt produced.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::InvalidStatusTransition`] unless the
    /// resource is being generated, and
    /// [`ResourceDomainError::MissingArtifact`] when no artifact exists.
    pub fn surface_for_review(&mut self, clock: &impl Clock) -> Result<(), ResourceDomainError> {
        self.ensure_transition(ResourceStatus::Pending)?;
        if self.artifact_path.is_none() {
            return Err(ResourceDomainError::MissingArtifact(self.id));
        }
        self.status = ResourceStatus::Pending;
        self.touch(clock);
        Ok(())
    }

    /// Accepts a pending resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::InvalidStatusTransition`] unless the
    /// resource is pending.
    pub fn approve(
        &mut self,
        approver: ActorRef,
        clock: &impl Clock,
    ) -> Result<(), ResourceDomainError> {
        self.ensure_transition(ResourceStatus::Approved)?;
        self.decide(ResourceStatus::Approved, approver, None, clock);
        Ok(())
    }

    /// Refuses a pending resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceDomainError::InvalidStatusTransition`] unless the
    /// resource is pending.
    pub fn reject(
        &mut self,
        approver: ActorRef,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ResourceDomainError> {
        self.ensure_transition(ResourceStatus::Rejected)?;
        let trimmed_reason = reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        self.decide(ResourceStatus::Rejected, approver, trimmed_reason, clock);
        Ok(())
    }

    fn decide(
        &mut self,
        status: ResourceStatus,
        approver: ActorRef,
        rejection_reason: Option<String>,
        clock: &impl Clock,
    ) {
        let timestamp = clock.utc();
        self.status = status;
        self.approver = Some(approver);
        self.decided_at = Some(timestamp);
        self.rejection_reason = rejection_reason;
        self.updated_at = timestamp;
    }

    const fn ensure_transition(&self, target: ResourceStatus) -> Result<(), ResourceDomainError> {
        if self.status.can_transition_to(target) {
            return Ok(());
        }
        Err(ResourceDomainError::InvalidStatusTransition {
            resource_id: self.id,
            from: self.status,
            to: target,
        })
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
