//! Lease lock behaviour against `PostgreSQL`.

use super::helpers::{TestDatabase, start_of_day, test_runtime};
use chrono::TimeDelta;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use stellar_jobs::schedule::{
    adapters::postgres::PostgresTaskLock,
    domain::{LockOwner, TaskName},
    ports::TaskLockProvider,
};

const TTL: TimeDelta = TimeDelta::minutes(10);

fn owner(host: &str) -> Result<LockOwner, eyre::Report> {
    Ok(LockOwner::new(host)?)
}

#[rstest]
fn concurrent_acquisitions_grant_one_lease(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "lock_race")?;
    let first = PostgresTaskLock::new(database.pool()?);
    let second = PostgresTaskLock::new(database.pool()?);
    let (host_a, host_b) = (owner("jobs-host-a")?, owner("jobs-host-b")?);
    let rt = test_runtime()?;

    for round in 0..5 {
        let task = TaskName::new(format!("nightly-report-{round}"))?;
        let (left, right) = rt.block_on(async {
            tokio::join!(
                first.try_acquire(&task, &host_a, start_of_day(), TTL),
                second.try_acquire(&task, &host_b, start_of_day(), TTL),
            )
        });
        let granted = [left?, right?].into_iter().flatten().count();
        eyre::ensure!(granted == 1, "round {round} granted {granted} leases");
    }
    Ok(())
}

#[rstest]
fn expired_leases_are_reclaimed(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "lock_expiry")?;
    let lock = PostgresTaskLock::new(database.pool()?);
    let task = TaskName::new("prune-sessions")?;
    let successor = owner("jobs-host-b")?;
    let rt = test_runtime()?;

    let held = rt
        .block_on(lock.try_acquire(&task, &owner("jobs-host-a")?, start_of_day(), TTL))?
        .ok_or_else(|| eyre::eyre!("free lease should be granted"))?;

    let mid_lease = start_of_day() + TimeDelta::minutes(5);
    let blocked = rt.block_on(lock.try_acquire(&task, &successor, mid_lease, TTL))?;
    eyre::ensure!(blocked.is_none(), "live lease must not be taken over");

    let reclaimed = rt
        .block_on(lock.try_acquire(&task, &successor, held.expires_at(), TTL))?
        .ok_or_else(|| eyre::eyre!("expired lease should be reclaimable"))?;
    eyre::ensure!(reclaimed.lease_id() != held.lease_id(), "reclaim issues a new lease");
    eyre::ensure!(reclaimed.owner() == &successor, "reclaimed lease belongs to successor");
    eyre::ensure!(
        reclaimed.expires_at() == held.expires_at() + TTL,
        "reclaimed lease runs from the reclaim instant"
    );
    Ok(())
}

#[rstest]
fn stale_release_leaves_the_successor_lease(
    shared_test_cluster: &'static TestCluster,
) -> Result<(), eyre::Report> {
    let database = TestDatabase::create(shared_test_cluster, "lock_release")?;
    let lock = PostgresTaskLock::new(database.pool()?);
    let task = TaskName::new("refresh-leaderboard")?;
    let latecomer = owner("jobs-host-c")?;
    let rt = test_runtime()?;

    let stale = rt
        .block_on(lock.try_acquire(&task, &owner("jobs-host-a")?, start_of_day(), TTL))?
        .ok_or_else(|| eyre::eyre!("free lease should be granted"))?;
    let current = rt
        .block_on(lock.try_acquire(&task, &owner("jobs-host-b")?, stale.expires_at(), TTL))?
        .ok_or_else(|| eyre::eyre!("expired lease should be reclaimable"))?;

    rt.block_on(lock.release(&stale))?;
    let after_stale_release = current.acquired_at() + TimeDelta::minutes(1);
    let blocked = rt.block_on(lock.try_acquire(&task, &latecomer, after_stale_release, TTL))?;
    eyre::ensure!(blocked.is_none(), "stale release must not free the successor lease");

    rt.block_on(lock.release(&current))?;
    let freed = rt.block_on(lock.try_acquire(&task, &latecomer, after_stale_release, TTL))?;
    eyre::ensure!(freed.is_some(), "owner release frees the lease");
    Ok(())
}
