//! When steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("two ticks run at the same time")]
fn two_ticks(world: &mut SchedulingWorld) -> Result<(), eyre::Report> {
    let first = world.scheduler("scheduler-a", true)?;
    let second = world.scheduler("scheduler-b", false)?;
    let started = std::sync::Arc::clone(&world.started);
    let release = std::sync::Arc::clone(&world.release);

    let (first_report, second_report) = run_async(async {
        let overlapping = async {
            started.notified().await;
            let report = second.tick().await;
            release.notify_one();
            report
        };
        tokio::join!(first.tick(), overlapping)
    });
    world.reports.push(first_report.wrap_err("first tick")?);
    world.reports.push(second_report.wrap_err("second tick")?);
    Ok(())
}

#[when("a tick runs")]
fn single_tick(world: &mut SchedulingWorld) -> Result<(), eyre::Report> {
    let scheduler = world.scheduler("scheduler-a", false)?;
    let report = run_async(scheduler.tick()).wrap_err("tick")?;
    world.reports.push(report);
    Ok(())
}
