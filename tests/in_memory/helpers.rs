//! Shared fixtures for in-memory adapter integration tests.

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use stellar_jobs::clock::ManualClock;
use stellar_jobs::schedule::domain::{
    CommandIdentifier, ScheduleExpression, TaskDefinition, TaskName,
};

/// Fixed instant the scenarios start from.
pub fn start_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Provides a clock frozen at the start of the test day.
#[fixture]
pub fn clock() -> ManualClock {
    ManualClock::new(start_of_day())
}

/// Builds a definition whose command identifier mirrors the task name.
///
/// # Errors
///
/// Returns an error when `name` or `schedule` fail validation.
pub fn definition(name: &str, schedule: &str) -> Result<TaskDefinition, eyre::Report> {
    Ok(TaskDefinition::new(
        TaskName::new(name)?,
        CommandIdentifier::new(format!("stellar:{name}"))?,
        ScheduleExpression::parse(schedule)?,
    ))
}
