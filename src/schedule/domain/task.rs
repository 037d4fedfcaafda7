//! Scheduled task aggregate and provisioning definitions.

use super::{CommandIdentifier, ScheduleExpression, TaskName, TickWindow};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Provisioning input for a scheduled task.
///
/// Definitions come from seed configuration and carry only the fields an
/// operator controls; run bookkeeping belongs to [`ScheduledTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    name: TaskName,
    command: CommandIdentifier,
    schedule: ScheduleExpression,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl TaskDefinition {
    /// Creates an enabled definition without a description.
    #[must_use]
    pub const fn new(
        name: TaskName,
        command: CommandIdentifier,
        schedule: ScheduleExpression,
    ) -> Self {
        Self {
            name,
            command,
            schedule,
            description: None,
            enabled: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial enabled flag used when the task is first created.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the command identifier.
    #[must_use]
    pub const fn command(&self) -> &CommandIdentifier {
        &self.command
    }

    /// Returns the schedule expression.
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleExpression {
        &self.schedule
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the initial enabled flag.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Named recurring unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    name: TaskName,
    command: CommandIdentifier,
    schedule: ScheduleExpression,
    description: Option<String>,
    is_enabled: bool,
    last_run_at: Option<DateTime<Utc>>,
    next_run_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedScheduledTaskData {
    /// Persisted task name.
    pub name: TaskName,
    /// Persisted command identifier.
    pub command: CommandIdentifier,
    /// Persisted schedule expression.
    pub schedule: ScheduleExpression,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted enabled flag.
    pub is_enabled: bool,
    /// Last dispatch timestamp.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Next expected dispatch timestamp.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ScheduledTask {
    /// Creates a task from a provisioning definition.
    ///
    /// `next_run_at` is primed with the first occurrence after creation so
    /// listings show when the task will first fire.
    #[must_use]
    pub fn provision(definition: TaskDefinition, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let next_run_at = definition.schedule.next_after(&timestamp);
        Self {
            name: definition.name,
            command: definition.command,
            schedule: definition.schedule,
            description: definition.description,
            is_enabled: definition.enabled,
            last_run_at: None,
            next_run_at,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedScheduledTaskData) -> Self {
        Self {
            name: data.name,
            command: data.command,
            schedule: data.schedule,
            description: data.description,
            is_enabled: data.is_enabled,
            last_run_at: data.last_run_at,
            next_run_at: data.next_run_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the command identifier.
    #[must_use]
    pub const fn command(&self) -> &CommandIdentifier {
        &self.command
    }

    /// Returns the schedule expression.
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleExpression {
        &self.schedule
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the scheduler may dispatch this task.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Returns the last dispatch timestamp.
    #[must_use]
    pub const fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_at
    }

    /// Returns the next expected dispatch timestamp.
    #[must_use]
    pub const fn next_run_at(&self) -> Option<DateTime<Utc>> {
        self.next_run_at
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

    /// Enables the task.
    pub fn enable(&mut self, clock: &impl Clock) {
        self.set_enabled(true, clock);
    }

    /// Disables the task.
    pub fn disable(&mut self, clock: &impl Clock) {
        self.set_enabled(false, clock);
    }

    /// Flips the enabled flag.
    pub fn toggle(&mut self, clock: &impl Clock) {
        self.set_enabled(!self.is_enabled, clock);
    }

    /// Returns `true` when the task is enabled, its schedule fires in
    /// `window`, and it has not run since the window opened.
    #[must_use]
    pub fn is_due(&self, window: &TickWindow) -> bool {
        self.is_enabled && self.schedule.matches(window) && !self.has_run_in(window)
    }

    /// Returns `true` when the last run happened at or after the window start.
    #[must_use]
    pub fn has_run_in(&self, window: &TickWindow) -> bool {
        self.last_run_at
            .is_some_and(|last_run| last_run >= window.start())
    }

    /// Records a dispatch at the current clock time and computes the next
    /// occurrence.
    pub fn record_run(&mut self, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.last_run_at = Some(timestamp);
        self.next_run_at = self.schedule.next_after(&timestamp);
        self.updated_at = timestamp;
    }

    /// Applies a re-provisioned definition.
    ///
    /// The enabled flag and run bookkeeping are left untouched so reseeding
    /// never re-enables a task an operator switched off.
    pub fn redefine(&mut self, definition: TaskDefinition, clock: &impl Clock) {
        let timestamp = clock.utc();
        if self.schedule != definition.schedule {
            self.next_run_at = definition.schedule.next_after(&timestamp);
        }
        self.command = definition.command;
        self.schedule = definition.schedule;
        self.description = definition.description;
        self.updated_at = timestamp;
    }

    fn set_enabled(&mut self, enabled: bool, clock: &impl Clock) {
        self.is_enabled = enabled;
        self.updated_at = clock.utc();
    }
}
