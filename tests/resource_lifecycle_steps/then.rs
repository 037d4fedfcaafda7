//! Then steps for resource lifecycle BDD scenarios.

use super::world::ResourceWorld;
use rstest_bdd_macros::then;
use stellar_jobs::resource::{
    domain::{Resource, ResourceEvent, ResourceStatus},
    services::{ApprovalError, ExecutionError},
};

fn stored(world: &ResourceWorld) -> Result<Resource, eyre::Report> {
    world
        .stored_resource()?
        .ok_or_else(|| eyre::eyre!("resource was removed"))
}

#[then(r#"the resource status is "{status}""#)]
fn resource_status_is(world: &ResourceWorld, status: String) -> Result<(), eyre::Report> {
    let expected = ResourceStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let resource = stored(world)?;
    eyre::ensure!(
        resource.status() == expected,
        "expected status {expected}, found {}",
        resource.status()
    );
    Ok(())
}

#[then("the resource has {count:usize} recorded attempts")]
fn resource_has_attempts(world: &ResourceWorld, count: usize) -> Result<(), eyre::Report> {
    let resource = stored(world)?;
    eyre::ensure!(
        resource.attempts().len() == count,
        "expected {count} attempts, found {}",
        resource.attempts().len()
    );
    Ok(())
}

#[then(r#"the resource artifact is "{artifact}""#)]
fn resource_artifact_is(world: &ResourceWorld, artifact: String) -> Result<(), eyre::Report> {
    let resource = stored(world)?;
    let actual = resource.artifact_path().map(|path| path.as_str().to_owned());
    eyre::ensure!(
        actual.as_deref() == Some(artifact.as_str()),
        "expected artifact {artifact}, found {actual:?}"
    );
    Ok(())
}

#[then("the generation reports exhausted attempts")]
fn generation_exhausted(world: &ResourceWorld) -> Result<(), eyre::Report> {
    let result = world
        .generation_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing generation result"))?;
    eyre::ensure!(
        matches!(result, Err(ExecutionError::Exhausted { .. })),
        "expected exhausted attempts, got {result:?}"
    );
    Ok(())
}

#[then("the resource no longer exists")]
fn resource_removed(world: &ResourceWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.stored_resource()?.is_none(),
        "resource should have been deleted"
    );
    Ok(())
}

#[then("a deletion event lists {count:usize} attempts")]
fn deletion_event_lists_attempts(world: &ResourceWorld, count: usize) -> Result<(), eyre::Report> {
    let events = world.listener.events()?;
    let listed = events.iter().find_map(|event| match event {
        ResourceEvent::Deleted { attempts, .. } => Some(attempts.len()),
        _ => None,
    });
    eyre::ensure!(
        listed == Some(count),
        "expected a deletion event with {count} attempts, found {listed:?}"
    );
    Ok(())
}

#[then("the resource has no rejection reason")]
fn no_rejection_reason(world: &ResourceWorld) -> Result<(), eyre::Report> {
    let resource = stored(world)?;
    eyre::ensure!(
        resource.rejection_reason().is_none(),
        "unexpected rejection reason {:?}",
        resource.rejection_reason()
    );
    Ok(())
}

#[then("the resource records a decision time")]
fn decision_time_recorded(world: &ResourceWorld) -> Result<(), eyre::Report> {
    let resource = stored(world)?;
    eyre::ensure!(resource.decided_at().is_some(), "decision time missing");
    Ok(())
}

#[then(r#"the rejection reason is "{reason}""#)]
fn rejection_reason_is(world: &ResourceWorld, reason: String) -> Result<(), eyre::Report> {
    let resource = stored(world)?;
    eyre::ensure!(
        resource.rejection_reason() == Some(reason.as_str()),
        "expected reason {reason}, found {:?}",
        resource.rejection_reason()
    );
    Ok(())
}

#[then("the decision fails with an invalid state error")]
fn decision_invalid_state(world: &ResourceWorld) -> Result<(), eyre::Report> {
    let result = world
        .decision_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing decision result"))?;
    eyre::ensure!(
        matches!(result, Err(ApprovalError::InvalidState { .. })),
        "expected InvalidState error, got {result:?}"
    );
    Ok(())
}
