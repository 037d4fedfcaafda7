//! End-to-end resource pipeline over in-memory adapters.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::rstest;
use stellar_jobs::resource::{
    adapters::memory::{InMemoryResourceRepository, RecordingEventListener},
    domain::{ActorRef, ArtifactPath, Resource, ResourceEvent, ResourceKind, ResourceStatus},
    ports::{GenerationWork, WorkFailure},
    services::{
        ApprovalGate, ApprovedResourceCache, GenerationExecutor, ResourceEvents,
        ResourceSubmissionService, SubmitResourceRequest,
    },
};

/// Stores the planet still, then fails the video step on the first attempt.
struct PlanetVideoWork;

#[async_trait]
impl GenerationWork for PlanetVideoWork {
    async fn generate(
        &self,
        resource: &Resource,
        attempt: u32,
    ) -> Result<ArtifactPath, WorkFailure> {
        let still = ArtifactPath::new(format!("planets/{}.png", resource.id()))
            .map_err(|err| WorkFailure::new(err.to_string()))?;
        if attempt == 1 {
            return Err(WorkFailure::new("video render timed out").with_partial_artifact(still));
        }
        ArtifactPath::new(format!("planets/{}.mp4", resource.id()))
            .map_err(|err| WorkFailure::new(err.to_string()))
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_resource_flows_through_generation_and_review() -> Result<(), eyre::Report> {
    let repository = Arc::new(InMemoryResourceRepository::new());
    let clock = Arc::new(DefaultClock);
    let recorder = Arc::new(RecordingEventListener::new());
    let cache = Arc::new(ApprovedResourceCache::new(Arc::clone(&repository)));
    let events = ResourceEvents::new()
        .with_listener(recorder.clone())
        .with_listener(cache.clone());

    let submission = ResourceSubmissionService::new(Arc::clone(&repository), Arc::clone(&clock));
    let executor =
        GenerationExecutor::new(Arc::clone(&repository), events.clone(), Arc::clone(&clock));
    let gate = ApprovalGate::new(Arc::clone(&repository), events, clock);

    let resource = submission
        .submit(SubmitResourceRequest::new(
            ResourceKind::PlanetVideo,
            "A volcanic moon orbiting a gas giant",
            "player-77",
        ))
        .await?;
    eyre::ensure!(
        cache.approved(ResourceKind::PlanetVideo).await?.is_empty(),
        "nothing is approved yet"
    );

    let outcome = executor.execute(resource.id(), &PlanetVideoWork, 3).await?;
    let generated = outcome.resource();
    eyre::ensure!(
        generated.status() == ResourceStatus::Pending,
        "generated resource should await review"
    );
    eyre::ensure!(generated.attempts().len() == 1, "one failed attempt expected");
    eyre::ensure!(
        generated
            .artifact_path()
            .is_some_and(|path| path.as_str().ends_with(".mp4")),
        "final artifact should replace the partial one"
    );

    let queue = gate.pending_queue().await?;
    eyre::ensure!(queue.len() == 1, "one resource awaits review");

    let approved = gate.approve(resource.id(), ActorRef::new("admin")?).await?;
    eyre::ensure!(
        approved.status() == ResourceStatus::Approved,
        "resource should be approved"
    );
    eyre::ensure!(gate.pending_queue().await?.is_empty(), "review queue should be empty");

    let cached = cache.approved(ResourceKind::PlanetVideo).await?;
    eyre::ensure!(cached.len() == 1, "approval should invalidate the cache");

    let labels: Vec<&str> = recorder
        .events()?
        .iter()
        .map(ResourceEvent::label)
        .collect();
    eyre::ensure!(labels == vec!["surfaced", "approved"], "unexpected events {labels:?}");
    Ok(())
}
