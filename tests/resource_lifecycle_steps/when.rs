//! When steps for resource lifecycle BDD scenarios.

use super::world::{ResourceWorld, run_async};
use rstest_bdd_macros::when;
use stellar_jobs::resource::{
    domain::{ActorRef, Resource},
    services::ApprovalResult,
};

#[when("the resource is generated with at most {max_attempts:u32} attempts")]
fn generate_resource(world: &mut ResourceWorld, max_attempts: u32) -> Result<(), eyre::Report> {
    let id = world.resource_id()?;
    let generator = world
        .generator
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing generator in scenario world"))?;
    let result = run_async(world.executor.execute(id, generator, max_attempts));
    world.generation_result = Some(result);
    Ok(())
}

fn record_decision(world: &mut ResourceWorld, result: ApprovalResult<Resource>) {
    world.decision_result = Some(result);
}

#[when(r#""{approver}" approves the resource"#)]
fn approve_resource(world: &mut ResourceWorld, approver: String) -> Result<(), eyre::Report> {
    let id = world.resource_id()?;
    let result = run_async(world.gate.approve(id, ActorRef::new(approver)?));
    record_decision(world, result);
    Ok(())
}

#[when(r#""{approver}" rejects the resource"#)]
fn reject_resource(world: &mut ResourceWorld, approver: String) -> Result<(), eyre::Report> {
    let id = world.resource_id()?;
    let result = run_async(world.gate.reject(id, ActorRef::new(approver)?, None));
    record_decision(world, result);
    Ok(())
}

#[when(r#""{approver}" rejects the resource because "{reason}""#)]
fn reject_resource_with_reason(
    world: &mut ResourceWorld,
    approver: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let id = world.resource_id()?;
    let result = run_async(world.gate.reject(id, ActorRef::new(approver)?, Some(reason)));
    record_decision(world, result);
    Ok(())
}
