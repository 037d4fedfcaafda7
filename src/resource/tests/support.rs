//! Shared fixtures for resource service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::clock::ManualClock;
use crate::resource::{
    adapters::memory::{InMemoryResourceRepository, RecordingEventListener},
    domain::{ActorRef, ArtifactPath, Resource, ResourceKind},
    ports::{GenerationWork, ResourceRepository, WorkFailure},
    services::{ApprovalGate, GenerationExecutor, ResourceEvents},
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rstest::fixture;

pub fn actor(value: &str) -> ActorRef {
    ActorRef::new(value).expect("valid actor")
}

pub fn artifact(value: &str) -> ArtifactPath {
    ArtifactPath::new(value).expect("valid artifact path")
}

/// Generation work that replays a fixed script of attempt results.
pub struct ScriptedWork {
    script: Mutex<VecDeque<Result<ArtifactPath, WorkFailure>>>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedWork {
    pub fn new(script: impl IntoIterator<Item = Result<ArtifactPath, WorkFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(messages: &[&str]) -> Self {
        Self::new(
            messages
                .iter()
                .map(|message| Err(WorkFailure::new(*message))),
        )
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GenerationWork for ScriptedWork {
    async fn generate(
        &self,
        _resource: &Resource,
        attempt: u32,
    ) -> Result<ArtifactPath, WorkFailure> {
        self.calls.lock().expect("calls lock").push(attempt);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(WorkFailure::new("script exhausted")))
    }
}

pub struct Harness {
    pub repository: Arc<InMemoryResourceRepository>,
    pub clock: ManualClock,
    pub listener: Arc<RecordingEventListener>,
}

impl Harness {
    pub fn events(&self) -> ResourceEvents {
        ResourceEvents::new().with_listener(self.listener.clone())
    }

    pub fn executor(&self) -> GenerationExecutor<InMemoryResourceRepository, ManualClock> {
        GenerationExecutor::new(
            Arc::clone(&self.repository),
            self.events(),
            Arc::new(self.clock.clone()),
        )
    }

    pub fn gate(&self) -> ApprovalGate<InMemoryResourceRepository, ManualClock> {
        ApprovalGate::new(
            Arc::clone(&self.repository),
            self.events(),
            Arc::new(self.clock.clone()),
        )
    }

    pub async fn submitted(&self, kind: ResourceKind) -> Resource {
        let resource = Resource::submit(
            kind,
            "A desert world with twin moons",
            actor("player-1"),
            &self.clock,
        )
        .expect("valid resource");
        self.repository
            .store(&resource)
            .await
            .expect("store should succeed");
        resource
    }

    /// Stores a resource that already went through generation.
    pub async fn pending(&self, kind: ResourceKind) -> Resource {
        let resource = self.submitted(kind).await;
        let work = ScriptedWork::new([Ok(artifact("resources/generated.png"))]);
        self.executor()
            .execute(resource.id(), &work, 3)
            .await
            .expect("generation should succeed")
            .resource()
            .clone()
    }
}

#[fixture]
pub fn harness() -> Harness {
    let now = Utc
        .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Harness {
        repository: Arc::new(InMemoryResourceRepository::new()),
        clock: ManualClock::new(now),
        listener: Arc::new(RecordingEventListener::new()),
    }
}
