//! Version-guarded resource persistence against `PostgreSQL`.

use super::helpers::{TestDatabase, start_of_day, test_runtime};
use chrono::TimeDelta;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use stellar_jobs::clock::ManualClock;
use stellar_jobs::resource::{
    adapters::postgres::PostgresResourceRepository,
    domain::{ActorRef, ArtifactPath, Resource, ResourceKind, ResourceStatus},
    ports::{ResourceRepository, ResourceRepositoryError},
};

fn submitted(clock: &ManualClock) -> Result<Resource, eyre::Report> {
    Ok(Resource::submit(
        ResourceKind::Avatar,
        "A lighthouse keeper with a brass telescope",
        ActorRef::new("player-7")?,
        clock,
    )?)
}

#[rstest]
fn stale_updates_are_rejected(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "resource_update")?;
    let repository = PostgresResourceRepository::new(database.pool()?);
    let clock = ManualClock::new(start_of_day());
    let rt = test_runtime()?;
    let resource = submitted(&clock)?;
    rt.block_on(repository.store(&resource))?;

    clock.advance(TimeDelta::seconds(30));
    let mut winner = resource.clone();
    winner.record_failure("renderer timed out", None, &clock)?;
    let saved = rt.block_on(repository.update(&winner))?;
    eyre::ensure!(saved.version() == 2, "update bumps the version");

    let mut loser = resource.clone();
    loser.complete_generation(ArtifactPath::new("avatars/keeper.png")?, &clock)?;
    let result = rt.block_on(repository.update(&loser));
    eyre::ensure!(
        matches!(
            result,
            Err(ResourceRepositoryError::VersionConflict { resource_id, expected: 1 })
                if resource_id == resource.id()
        ),
        "expected version conflict, got {result:?}"
    );

    let stored = rt
        .block_on(repository.find_by_id(resource.id()))?
        .ok_or_else(|| eyre::eyre!("resource should exist"))?;
    eyre::ensure!(stored == saved, "losing write must leave the winner in place");
    eyre::ensure!(stored.status() == ResourceStatus::Generating, "status unchanged");
    eyre::ensure!(stored.attempts().len() == 1, "attempt history survives the round trip");
    Ok(())
}

#[rstest]
fn deletes_check_the_version(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "resource_delete")?;
    let repository = PostgresResourceRepository::new(database.pool()?);
    let clock = ManualClock::new(start_of_day());
    let rt = test_runtime()?;
    let resource = submitted(&clock)?;
    rt.block_on(repository.store(&resource))?;

    let mut generated = resource.clone();
    generated.complete_generation(ArtifactPath::new("avatars/keeper.png")?, &clock)?;
    let saved = rt.block_on(repository.update(&generated))?;

    let stale = rt.block_on(repository.delete(&resource));
    eyre::ensure!(
        matches!(stale, Err(ResourceRepositoryError::VersionConflict { expected: 1, .. })),
        "expected version conflict, got {stale:?}"
    );

    rt.block_on(repository.delete(&saved))?;
    let gone = rt.block_on(repository.delete(&saved));
    eyre::ensure!(
        matches!(gone, Err(ResourceRepositoryError::NotFound(id)) if id == resource.id()),
        "expected not found, got {gone:?}"
    );
    Ok(())
}

#[rstest]
fn status_listing_is_creation_ordered(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "resource_listing")?;
    let repository = PostgresResourceRepository::new(database.pool()?);
    let clock = ManualClock::new(start_of_day());
    let rt = test_runtime()?;

    let mut expected = Vec::new();
    for _ in 0..3 {
        let resource = submitted(&clock)?;
        rt.block_on(repository.store(&resource))?;
        expected.push(resource.id());
        clock.advance(TimeDelta::seconds(1));
    }

    let listed: Vec<_> = rt
        .block_on(repository.find_by_status(ResourceStatus::Generating))?
        .iter()
        .map(Resource::id)
        .collect();
    eyre::ensure!(listed == expected, "expected {expected:?}, got {listed:?}");

    let pending = rt.block_on(repository.find_by_status(ResourceStatus::Pending))?;
    eyre::ensure!(pending.is_empty(), "no resource has finished generating");
    Ok(())
}
