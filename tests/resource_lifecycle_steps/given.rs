//! Given steps for resource lifecycle BDD scenarios.

use super::world::{ResourceWorld, ScriptedGenerator, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use stellar_jobs::resource::{
    domain::{ArtifactPath, ResourceKind},
    services::SubmitResourceRequest,
};

fn submit(world: &mut ResourceWorld, kind: &str) -> Result<(), eyre::Report> {
    let resource_kind = ResourceKind::try_from(kind)
        .map_err(|err| eyre::eyre!("invalid kind in scenario: {err}"))?;
    let resource = run_async(world.submission.submit(SubmitResourceRequest::new(
        resource_kind,
        "A storm-wrapped ice giant",
        "player-1",
    )))
    .wrap_err("submit resource for scenario")?;
    world.resource_id = Some(resource.id());
    Ok(())
}

#[given(r#"a submitted "{kind}" resource"#)]
fn submitted_resource(world: &mut ResourceWorld, kind: String) -> Result<(), eyre::Report> {
    submit(world, &kind)
}

#[given(r#"a pending "{kind}" resource"#)]
fn pending_resource(world: &mut ResourceWorld, kind: String) -> Result<(), eyre::Report> {
    submit(world, &kind)?;
    let generator = ScriptedGenerator {
        succeeds_on: Some((1, ArtifactPath::new("resources/ready.png")?)),
    };
    let id = world.resource_id()?;
    run_async(world.executor.execute(id, &generator, 3)).wrap_err("generate pending resource")?;
    Ok(())
}

#[given(r#"the generator produces "{artifact}" on attempt {attempt:u32}"#)]
fn generator_succeeds_on(
    world: &mut ResourceWorld,
    artifact: String,
    attempt: u32,
) -> Result<(), eyre::Report> {
    world.generator = Some(ScriptedGenerator {
        succeeds_on: Some((attempt, ArtifactPath::new(artifact)?)),
    });
    Ok(())
}

#[given("the generator always fails")]
fn generator_always_fails(world: &mut ResourceWorld) {
    world.generator = Some(ScriptedGenerator { succeeds_on: None });
}
